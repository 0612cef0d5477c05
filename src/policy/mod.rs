pub mod fair;
pub mod fifo;
pub mod rr;

use std::{fmt, str::FromStr};

use crate::{
    core::{Process, ProcessId, SimCtx},
    error::SimError,
};
pub use fair::FairSharePolicy;
pub use fifo::FifoPolicy;
pub use rr::RoundRobinPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Fifo,
    RoundRobin,
    FairShare,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [Self::Fifo, Self::RoundRobin, Self::FairShare];

    pub fn name(self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::RoundRobin => "round-robin",
            Self::FairShare => "fair-share",
        }
    }

    pub fn build(self) -> Box<dyn DispatchPolicy> {
        match self {
            Self::Fifo => Box::new(FifoPolicy),
            Self::RoundRobin => Box::new(RoundRobinPolicy::default()),
            Self::FairShare => Box::new(FairSharePolicy::default()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SimError::UnknownPolicy(s.to_string()))
    }
}

/// Decides which ready process runs on each tick.
///
/// The scheduler owns membership. A policy is told about readiness changes
/// through `enqueue`/`dequeue` and may keep its own bookkeeping, but `pick`
/// only ever sees the ready set through `SimCtx` and must cope with being
/// installed mid-run, before any `enqueue` reached it.
pub trait DispatchPolicy {
    fn kind(&self) -> PolicyKind;

    // Process became Ready and was not yet in the ready set
    fn enqueue(&mut self, _process: &mut Process) {}

    // Process left the ready set (blocked, completed or dispatched)
    fn dequeue(&mut self, _process: &Process) {}

    fn pick(&self, ctx: &SimCtx, prev: Option<ProcessId>) -> Option<ProcessId>;

    // Picked process just consumed one quantum
    fn charge(&mut self, _process: &mut Process) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.name().parse::<PolicyKind>().unwrap(), kind);
            assert_eq!(kind.build().kind(), kind);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "edf".parse::<PolicyKind>(),
            Err(SimError::UnknownPolicy("edf".to_string()))
        );
        assert!("FIFO".parse::<PolicyKind>().is_err());
    }
}
