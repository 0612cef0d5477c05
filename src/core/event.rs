use crate::core::{ProcessId, ProcessState};
use crate::policy::PolicyKind;

#[derive(Debug, Clone, PartialEq)]
pub enum SchedEvent {
    StateChange {
        pid: ProcessId,
        from: ProcessState,
        to: ProcessState,
    },
    // Picked by the policy and ran one quantum
    Dispatched {
        pid: ProcessId,
    },
    Completed {
        pid: ProcessId,
    },
    // Ready set empty, nothing ran this tick
    Idle,
    PolicySwitched {
        from: PolicyKind,
        to: PolicyKind,
    },
}
