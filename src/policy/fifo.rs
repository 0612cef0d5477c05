use super::{DispatchPolicy, PolicyKind};
use crate::core::{ProcessId, SimCtx};

/// Runs the oldest-enqueued ready process.
pub struct FifoPolicy;

impl DispatchPolicy for FifoPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fifo
    }

    fn pick(&self, ctx: &SimCtx, _prev: Option<ProcessId>) -> Option<ProcessId> {
        ctx.ready_ids().next()
    }
}
