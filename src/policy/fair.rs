use std::cmp;

use super::{DispatchPolicy, PolicyKind};
use crate::core::{Process, ProcessId, SimCtx};

/// Virtual-runtime scheduling.
///
/// Each quantum run adds one to the process's `fair_share_time`; the ready
/// process with the smallest value runs next. Newly ready processes are
/// lifted to `min_vruntime` so that a long sleep does not buy them a burst
/// of back-to-back quanta.
///
/// Selection is a linear scan of the ready set. An ordered index would make
/// it O(log n) but has to preserve the same tie-breaking: the process that
/// ran last keeps the CPU on ties, otherwise earlier ready-set position wins.
#[derive(Debug, Default)]
pub struct FairSharePolicy {
    min_vruntime: u64,
}

impl FairSharePolicy {
    pub fn min_vruntime(&self) -> u64 {
        self.min_vruntime
    }
}

impl DispatchPolicy for FairSharePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::FairShare
    }

    fn enqueue(&mut self, process: &mut Process) {
        process.fair_share_time = cmp::max(process.fair_share_time, self.min_vruntime);
    }

    fn pick(&self, ctx: &SimCtx, prev: Option<ProcessId>) -> Option<ProcessId> {
        let mut candidate = prev
            .filter(|&pid| ctx.is_ready(pid))
            .or_else(|| ctx.ready_ids().next())?;
        let mut best = ctx.get(candidate)?.fair_share_time;

        for pid in ctx.ready_ids() {
            let vtime = ctx.process(pid).fair_share_time;
            if vtime < best {
                candidate = pid;
                best = vtime;
            }
        }

        Some(candidate)
    }

    // Progress global vtime
    fn charge(&mut self, process: &mut Process) {
        process.fair_share_time += 1;
        self.min_vruntime = cmp::max(self.min_vruntime, process.fair_share_time);
    }
}
