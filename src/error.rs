use crate::core::{ProcessId, ProcessState};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Rejected before any process is created.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("process {pid} cannot {action} from state {from}")]
    IllegalStateTransition {
        pid: ProcessId,
        from: ProcessState,
        action: &'static str,
    },

    #[error("unknown process {0}")]
    UnknownProcess(ProcessId),

    #[error("unknown policy {0:?}, expected one of: fifo, round-robin, fair-share")]
    UnknownPolicy(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
