use average::{Estimate, Mean};
use std::fmt;

use super::driver::Sim;
use crate::{core::Ticks, policy::PolicyKind};

#[derive(Debug, Clone, PartialEq)]
pub struct SimReport {
    pub policy: PolicyKind,
    pub ticks: Ticks,
    pub jobs: usize,
    pub completed: usize,
    /// Ticks from arrival to first quantum.
    pub mean_response: f64,
    /// Ticks from arrival to completion, over completed jobs.
    pub mean_turnaround: f64,
    pub idle_ticks: Ticks,
    pub longest_idle: Ticks,
}

impl SimReport {
    pub fn from_sim(sim: &Sim) -> Self {
        let response = sim.jobs_map(|j| j.start_time.map(|s| s - j.job.arrival_time));
        let turnaround = sim.jobs_map(|j| j.completion_time.map(|c| c - j.job.arrival_time));

        Self {
            policy: sim.sched.policy(),
            ticks: sim.sched.now(),
            jobs: sim.jobs.len(),
            completed: sim
                .jobs
                .iter()
                .filter(|j| j.completion_time.is_some())
                .count(),
            mean_response: avg(response),
            mean_turnaround: avg(turnaround),
            idle_ticks: sim.idle_ticks(),
            longest_idle: sim.longest_idle(),
        }
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Policy: {}", self.policy)?;
        writeln!(f, "Ticks simulated: {}", self.ticks)?;
        writeln!(f, "Jobs completed: {}/{}", self.completed, self.jobs)?;
        writeln!(f, "Average response time: {:.2} ticks", self.mean_response)?;
        writeln!(f, "Average turnaround time: {:.2} ticks", self.mean_turnaround)?;
        write!(
            f,
            "Idle ticks: {} (longest streak {})",
            self.idle_ticks, self.longest_idle
        )
    }
}
