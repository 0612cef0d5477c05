use log::debug;
use std::collections::HashMap;

use super::job::{Job, JobInstance};
use crate::{
    core::{ProcessId, SchedEvent, Scheduler, Ticks},
    error::Result,
};

/// Feeds a job list into a `Scheduler` as the clock reaches each arrival
/// time and tracks per-job start and completion ticks.
pub struct Sim {
    pub sched: Scheduler,
    pub jobs: Vec<JobInstance>,
    job_cursor: usize,
    // ProcessId --> jobs[index]; used to propagate dispatch/completion to the job
    pids_to_jobs: HashMap<ProcessId, usize>,
    idle_streak: Ticks,
    longest_idle: Ticks,
    idle_ticks: Ticks,
}

impl Sim {
    /// Fails without building anything if any job has an invalid process
    /// configuration.
    pub fn new(mut jobs: Vec<Job>, sched: Scheduler) -> Result<Self> {
        for job in &jobs {
            job.process_config().validate()?;
        }

        jobs.sort_by(|a, b| {
            a.arrival_time
                .cmp(&b.arrival_time)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(Self {
            sched,
            jobs: jobs.into_iter().map(JobInstance::new).collect(),
            job_cursor: 0,
            pids_to_jobs: HashMap::new(),
            idle_streak: 0,
            longest_idle: 0,
            idle_ticks: 0,
        })
    }

    pub fn step(&mut self) -> Result<Vec<SchedEvent>> {
        self.handle_arrivals()?;

        let tick = self.sched.now();
        let events = self.sched.step()?;
        let now = self.sched.now();

        for event in &events {
            match *event {
                SchedEvent::Dispatched { pid } => {
                    if let Some(&index) = self.pids_to_jobs.get(&pid) {
                        self.jobs[index].start_time.get_or_insert(tick);
                    }
                }
                SchedEvent::Completed { pid } => {
                    if let Some(&index) = self.pids_to_jobs.get(&pid) {
                        self.jobs[index].completion_time = Some(now);
                    }
                }
                SchedEvent::Idle => {
                    self.idle_ticks += 1;
                    self.idle_streak += 1;
                    self.longest_idle = self.longest_idle.max(self.idle_streak);
                }
                _ => {}
            }
        }

        if self.sched.running().is_some() {
            self.idle_streak = 0;
        }

        Ok(events)
    }

    fn handle_arrivals(&mut self) -> Result<()> {
        let now = self.sched.now();

        // Contiguous, since jobs are sorted by arrival
        while let Some(instance) = self.jobs.get_mut(self.job_cursor) {
            if instance.job.arrival_time > now {
                break;
            }

            let pid = self.sched.spawn_with(&instance.job.process_config())?;
            debug!("t={now} job {} arrived as process {pid}", instance.job.id);
            instance.pid = Some(pid);
            self.pids_to_jobs.insert(pid, self.job_cursor);
            self.job_cursor += 1;
        }

        Ok(())
    }

    /// Steps until every job has completed or `max_ticks` have elapsed.
    pub fn run(&mut self, max_ticks: Ticks) -> Result<()> {
        while !self.all_jobs_completed() && self.sched.now() < max_ticks {
            self.step()?;
        }
        Ok(())
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.jobs.iter().all(|job| job.completion_time.is_some())
    }

    pub fn jobs_map<'a, F>(&'a self, f: F) -> impl Iterator<Item = f64> + 'a
    where
        F: Fn(&JobInstance) -> Option<Ticks> + 'a,
    {
        self.jobs.iter().filter_map(move |j| f(j).map(|t| t as f64))
    }

    pub fn longest_idle(&self) -> Ticks {
        self.longest_idle
    }

    pub fn idle_ticks(&self) -> Ticks {
        self.idle_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Constant, TotalQuanta};
    use crate::policy::PolicyKind;

    fn job(id: u64, arrival_time: Ticks, quanta: u64) -> Job {
        Job {
            id,
            arrival_time,
            total_quanta: TotalQuanta::Finite(quanta),
            cpu_utilization: 1.0,
        }
    }

    #[test]
    fn jobs_spawn_on_arrival() {
        let sched = Scheduler::new(PolicyKind::Fifo, Constant(0.5));
        let mut sim = Sim::new(vec![job(1, 2, 1), job(0, 0, 1)], sched).unwrap();

        sim.step().unwrap();
        assert_eq!(sim.sched.processes().len(), 1);
        assert_eq!(sim.jobs[0].start_time, Some(0));
        assert_eq!(sim.jobs[0].completion_time, Some(1));

        sim.step().unwrap();
        assert_eq!(sim.idle_ticks(), 1);
        sim.step().unwrap();
        assert_eq!(sim.jobs[1].pid, Some(2));
        assert_eq!(sim.jobs[1].start_time, Some(2));
        assert!(sim.all_jobs_completed());
        assert_eq!(sim.longest_idle(), 1);
    }

    #[test]
    fn invalid_job_is_rejected_up_front() {
        let sched = Scheduler::new(PolicyKind::Fifo, Constant(0.5));
        let mut bad = job(0, 0, 1);
        bad.cpu_utilization = 2.0;
        assert!(Sim::new(vec![job(1, 0, 1), bad], sched).is_err());
    }

    #[test]
    fn run_stops_at_max_ticks() {
        let sched = Scheduler::new(PolicyKind::RoundRobin, Constant(0.5));
        let mut forever = job(0, 0, 1);
        forever.total_quanta = TotalQuanta::Unbounded;
        let mut sim = Sim::new(vec![forever], sched).unwrap();
        sim.run(25).unwrap();
        assert_eq!(sim.sched.now(), 25);
        assert!(!sim.all_jobs_completed());
    }
}
