use super::{
    process::Process,
    state::{ProcessId, ProcessState, SimCtx, Ticks, TotalQuanta},
};
use crate::policy::PolicyKind;

/// Read-only copy of the simulator state, taken between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSnapshot {
    pub clock: Ticks,
    pub policy: PolicyKind,
    pub running: Option<ProcessId>,
    pub ready: Vec<ProcessId>,
    pub waiting: Vec<ProcessId>,
    pub processes: Vec<ProcessView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessView {
    pub id: ProcessId,
    pub state: ProcessState,
    pub consumed_quanta: u64,
    pub total_quanta: TotalQuanta,
    pub cpu_utilization: f64,
    pub fair_share_time: u64,
    pub history_tail: Vec<ProcessState>,
}

impl ProcessView {
    fn new(process: &Process, tail: usize) -> Self {
        Self {
            id: process.id,
            state: process.state,
            consumed_quanta: process.consumed_quanta,
            total_quanta: process.total_quanta,
            cpu_utilization: process.cpu_utilization,
            fair_share_time: process.fair_share_time,
            history_tail: process.history_tail(tail).to_vec(),
        }
    }
}

impl SimulationSnapshot {
    pub(crate) fn capture(ctx: &SimCtx, policy: PolicyKind, tail: usize) -> Self {
        let mut waiting: Vec<ProcessId> = ctx.waiting.iter().copied().collect();
        waiting.sort_unstable();

        Self {
            clock: ctx.now(),
            policy,
            running: ctx.running(),
            ready: ctx.ready_ids().collect(),
            waiting,
            processes: ctx
                .processes()
                .iter()
                .map(|p| ProcessView::new(p, tail))
                .collect(),
        }
    }

    pub fn process(&self, pid: ProcessId) -> Option<&ProcessView> {
        self.processes.iter().find(|p| p.id == pid)
    }
}
