use crate::{
    core::TotalQuanta,
    error::{Result, SimError},
    policy::PolicyKind,
};

pub const DEFAULT_HISTORY_TAIL: usize = 32;

/// Scheduler-wide settings.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub policy: PolicyKind,
    /// Seed for the `StdRng` that drives I/O transitions.
    pub seed: u64,
    /// Number of trailing history entries carried in each snapshot.
    pub history_tail: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Fifo,
            seed: 0,
            history_tail: DEFAULT_HISTORY_TAIL,
        }
    }
}

/// Settings for a single spawned process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessConfig {
    pub total_quanta: TotalQuanta,
    pub cpu_utilization: f64,
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cpu_utilization) {
            return Err(SimError::InvalidConfiguration(format!(
                "cpu utilization {} outside [0, 1]",
                self.cpu_utilization
            )));
        }
        if self.total_quanta == TotalQuanta::Finite(0) {
            return Err(SimError::InvalidConfiguration(
                "total quanta must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
