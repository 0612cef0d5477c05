use super::{DispatchPolicy, PolicyKind};
use crate::core::{Process, ProcessId, SimCtx};

/// Rotates through ready processes in spawn order.
///
/// The rotation is keyed by process id, so a process that blocks and wakes
/// up again keeps its slot instead of moving to the back.
#[derive(Debug, Default)]
pub struct RoundRobinPolicy {
    last: Option<ProcessId>,
}

impl DispatchPolicy for RoundRobinPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::RoundRobin
    }

    fn pick(&self, ctx: &SimCtx, prev: Option<ProcessId>) -> Option<ProcessId> {
        // Fresh after a switch: anchor on whatever ran last tick
        let anchor = self.last.or(prev);

        let mut front: Option<ProcessId> = None;
        let mut next: Option<ProcessId> = None;
        for pid in ctx.ready_ids() {
            front = Some(front.map_or(pid, |f| f.min(pid)));
            if anchor.is_some_and(|a| pid > a) {
                next = Some(next.map_or(pid, |n| n.min(pid)));
            }
        }

        next.or(front)
    }

    fn charge(&mut self, process: &mut Process) {
        self.last = Some(process.id);
    }
}
