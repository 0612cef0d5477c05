use super::state::{ProcessState, SimCtx};

/// Audits partition invariants after every tick. Checks compile away in
/// release builds; only the tick counter remains.
#[derive(Debug)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        self.step += 1;

        if let Some(pid) = ctx.running() {
            let state = ctx.process(pid).state;
            debug_assert!(
                matches!(state, ProcessState::Running | ProcessState::Done),
                "running process {pid} is {state}"
            );
            debug_assert!(
                !ctx.is_ready(pid) && !ctx.is_waiting(pid),
                "running process {pid} still tracked in a partition"
            );
        }

        for pid in ctx.ready_ids() {
            debug_assert_eq!(
                ctx.process(pid).state,
                ProcessState::Ready,
                "process {pid} in ready set must be Ready"
            );
            debug_assert!(
                !ctx.is_waiting(pid),
                "process {pid} present in both ready and waiting sets"
            );
        }

        for process in ctx.processes() {
            let pid = process.id;
            match process.state {
                ProcessState::Ready => debug_assert!(
                    ctx.is_ready(pid),
                    "ready process {pid} missing from ready set"
                ),
                ProcessState::Waiting => debug_assert!(
                    ctx.is_waiting(pid),
                    "waiting process {pid} missing from waiting set"
                ),
                ProcessState::Done => debug_assert!(
                    !ctx.is_ready(pid) && !ctx.is_waiting(pid),
                    "done process {pid} still tracked in a partition"
                ),
                ProcessState::Running => debug_assert_eq!(
                    ctx.running(),
                    Some(pid),
                    "process {pid} is Running but not the scheduled process"
                ),
            }

            if let Some(total) = process.total_quanta.finite() {
                debug_assert!(
                    process.consumed_quanta <= total,
                    "process {pid} consumed {} of {total} quanta",
                    process.consumed_quanta
                );
            }

            debug_assert_eq!(
                process.history().len() as u64,
                ctx.now() - process.spawned_at,
                "process {pid} history out of step with the clock"
            );
        }
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}
