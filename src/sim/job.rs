use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::ProcessConfig,
    core::{ProcessId, RandomSource, Ticks, TotalQuanta},
};

pub type JobId = u64;

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub total_quanta: TotalQuanta,
    pub cpu_utilization: f64,
}

impl Job {
    pub fn process_config(&self) -> ProcessConfig {
        ProcessConfig {
            total_quanta: self.total_quanta,
            cpu_utilization: self.cpu_utilization,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobInstance {
    pub job: Job,
    pub pid: Option<ProcessId>,
    // Tick index (clock before the step) of the first quantum
    pub start_time: Option<Ticks>,
    // Clock after the step that ran the last quantum
    pub completion_time: Option<Ticks>,
}

impl JobInstance {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            pid: None,
            start_time: None,
            completion_time: None,
        }
    }
}

/// Bernoulli arrival process: on each tick of the window a job arrives with
/// probability `p_arrival`, and is short with probability `p_short`.
#[derive(Debug, Clone)]
pub struct Workload {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_quanta: u64,
    pub long_quanta: u64,
    pub cpu_utilization: f64,
    pub seed: u64,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            ticks: 500,
            p_arrival: 0.3,
            p_short: 0.3,
            short_quanta: 2,
            long_quanta: 6,
            cpu_utilization: 0.8,
            seed: 0,
        }
    }
}

impl Workload {
    pub fn generate(&self) -> Vec<Job> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut jobs = Vec::new();

        for t in 0..self.ticks {
            if rng.next_f64() < self.p_arrival {
                let quanta = if rng.next_f64() < self.p_short {
                    self.short_quanta
                } else {
                    self.long_quanta
                };

                jobs.push(Job {
                    id: jobs.len() as JobId,
                    arrival_time: t,
                    total_quanta: TotalQuanta::Finite(quanta),
                    cpu_utilization: self.cpu_utilization,
                });
            }
        }

        jobs
    }
}
