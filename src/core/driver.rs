use log::{debug, info, trace};
use rand::{SeedableRng, rngs::StdRng};

use super::{
    event::SchedEvent,
    observer::Observer,
    process::{Process, Transition},
    random::RandomSource,
    snapshot::SimulationSnapshot,
    state::{ProcessId, ProcessState, SimCtx, Ticks, TotalQuanta},
};
use crate::{
    config::{DEFAULT_HISTORY_TAIL, ProcessConfig, SimConfig},
    error::{Result, SimError},
    policy::{DispatchPolicy, PolicyKind},
};

/// Single-CPU tick-driven scheduler.
///
/// Owns every process and the ready/waiting partitions; the active
/// `DispatchPolicy` only decides which ready process runs. Instances are
/// fully independent of each other.
pub struct Scheduler {
    ctx: SimCtx,
    policy: Box<dyn DispatchPolicy>,
    random: Box<dyn RandomSource>,
    observer: Observer,
    history_tail: usize,
    // Reported with the next step's events
    pending: Vec<SchedEvent>,
}

impl Scheduler {
    pub fn new(policy: PolicyKind, random: impl RandomSource + 'static) -> Self {
        Self {
            ctx: SimCtx::new(),
            policy: policy.build(),
            random: Box::new(random),
            observer: Observer::new(),
            history_tail: DEFAULT_HISTORY_TAIL,
            pending: Vec::new(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        let mut sched = Self::new(config.policy, StdRng::seed_from_u64(config.seed));
        sched.history_tail = config.history_tail;
        sched
    }

    pub fn spawn(
        &mut self,
        total_quanta: TotalQuanta,
        cpu_utilization: f64,
    ) -> Result<ProcessId> {
        self.spawn_with(&ProcessConfig {
            total_quanta,
            cpu_utilization,
        })
    }

    pub fn spawn_with(&mut self, config: &ProcessConfig) -> Result<ProcessId> {
        config.validate()?;

        let pid = self
            .ctx
            .create_process(config.total_quanta, config.cpu_utilization);
        self.policy.enqueue(self.ctx.process_mut(pid));
        self.ctx.push_ready(pid);

        info!(
            "spawned process {pid} (quanta={}, util={:.2}) at t={}",
            config.total_quanta,
            config.cpu_utilization,
            self.ctx.now()
        );
        Ok(pid)
    }

    /// Advances the simulation by one tick.
    ///
    /// A policy that picks a process outside the ready set fails the step
    /// with `IllegalStateTransition`; the tick still closes (clock and
    /// history advance) with nothing run and the partitions untouched. Events
    /// collected during a failed tick are reported by the next step.
    pub fn step(&mut self) -> Result<Vec<SchedEvent>> {
        self.ctx.advance_time(1);
        let mut events = std::mem::take(&mut self.pending);

        let prev = self.ctx.running.take();
        self.poll_processes(&mut events);
        let dispatched = self.dispatch(prev, &mut events);

        self.ctx.record_history();
        self.observer.observe(&self.ctx);

        if let Err(err) = dispatched {
            self.pending = events;
            return Err(err);
        }
        Ok(events)
    }

    fn poll_processes(&mut self, events: &mut Vec<SchedEvent>) {
        for pid in self.ctx.pids() {
            let transition = self.ctx.process_mut(pid).poll(self.random.as_mut());
            if !transition.is_change() {
                continue;
            }

            trace!(
                "t={} process {pid}: {} -> {}",
                self.ctx.now(),
                transition.from,
                transition.to
            );
            self.apply_transition(pid, transition);
            events.push(SchedEvent::StateChange {
                pid,
                from: transition.from,
                to: transition.to,
            });
        }
    }

    fn apply_transition(&mut self, pid: ProcessId, transition: Transition) {
        match transition.to {
            ProcessState::Waiting | ProcessState::Done => {
                if self.ctx.remove_ready(pid) {
                    self.policy.dequeue(self.ctx.process(pid));
                }
                if transition.to == ProcessState::Waiting {
                    self.ctx.insert_waiting(pid);
                } else {
                    self.ctx.remove_waiting(pid);
                }
            }
            ProcessState::Ready => {
                self.ctx.remove_waiting(pid);
                if !self.ctx.is_ready(pid) {
                    self.policy.enqueue(self.ctx.process_mut(pid));
                    self.ctx.push_ready(pid);
                }
            }
            ProcessState::Running => {
                debug_assert!(false, "polling never yields Running (process {pid})");
            }
        }
    }

    fn dispatch(&mut self, prev: Option<ProcessId>, events: &mut Vec<SchedEvent>) -> Result<()> {
        let Some(pid) = self.policy.pick(&self.ctx, prev) else {
            debug!("t={} idle, nothing ready", self.ctx.now());
            events.push(SchedEvent::Idle);
            return Ok(());
        };

        let state = self
            .ctx
            .get(pid)
            .map(|p| p.state)
            .ok_or(SimError::UnknownProcess(pid))?;
        if state != ProcessState::Ready || !self.ctx.is_ready(pid) {
            return Err(SimError::IllegalStateTransition {
                pid,
                from: state,
                action: "dispatch",
            });
        }

        self.ctx.remove_ready(pid);
        self.policy.dequeue(self.ctx.process(pid));
        let state = self.ctx.process_mut(pid).run()?;
        self.policy.charge(self.ctx.process_mut(pid));
        self.ctx.running = Some(pid);

        debug!(
            "t={} {} dispatched process {pid} ({}/{})",
            self.ctx.now(),
            self.policy.kind(),
            self.ctx.process(pid).consumed_quanta,
            self.ctx.process(pid).total_quanta
        );
        events.push(SchedEvent::Dispatched { pid });

        if state == ProcessState::Done {
            info!("process {pid} completed at t={}", self.ctx.now());
            events.push(SchedEvent::Completed { pid });
        }
        Ok(())
    }

    /// Accepts `fifo`, `round-robin` or `fair-share`. On error the current
    /// policy stays in place.
    pub fn set_policy(&mut self, name: &str) -> Result<()> {
        let kind = name.parse::<PolicyKind>()?;
        self.set_policy_kind(kind);
        Ok(())
    }

    pub fn set_policy_kind(&mut self, kind: PolicyKind) {
        let from = self.policy.kind();
        if from == kind {
            return;
        }

        debug!("t={} switching policy {from} -> {kind}", self.ctx.now());
        self.policy = kind.build();
        self.pending
            .push(SchedEvent::PolicySwitched { from, to: kind });
    }

    pub fn set_random_source(&mut self, random: impl RandomSource + 'static) {
        self.random = Box::new(random);
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot::capture(&self.ctx, self.policy.kind(), self.history_tail)
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now()
    }

    pub fn running(&self) -> Option<ProcessId> {
        self.ctx.running()
    }

    pub fn process(&self, pid: ProcessId) -> Option<&Process> {
        self.ctx.get(pid)
    }

    pub fn processes(&self) -> &[Process] {
        self.ctx.processes()
    }

    pub fn ctx(&self) -> &SimCtx {
        &self.ctx
    }

    pub fn all_done(&self) -> bool {
        self.ctx.processes().iter().all(Process::is_done)
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::{Constant, Scripted};

    // Never blocks with util=1.0, never wakes with util=0.0
    fn sched(policy: PolicyKind) -> Scheduler {
        Scheduler::new(policy, Constant(0.5))
    }

    fn run_order(sched: &mut Scheduler, ticks: usize) -> Vec<Option<ProcessId>> {
        (0..ticks)
            .map(|_| {
                sched.step().unwrap();
                sched.running()
            })
            .collect()
    }

    #[test]
    fn spawn_rejects_bad_config_without_side_effects() {
        let mut s = sched(PolicyKind::Fifo);
        assert!(matches!(
            s.spawn(TotalQuanta::Finite(3), 1.5),
            Err(SimError::InvalidConfiguration(_))
        ));
        assert!(s.spawn(TotalQuanta::Finite(0), 0.5).is_err());
        assert!(s.processes().is_empty());
        assert_eq!(s.spawn(TotalQuanta::Finite(1), 0.5).unwrap(), 1);
    }

    #[test]
    fn three_quanta_process_completes_in_three_ticks() {
        let mut s = sched(PolicyKind::Fifo);
        let pid = s.spawn(TotalQuanta::Finite(3), 1.0).unwrap();

        for _ in 0..3 {
            s.step().unwrap();
        }
        let p = s.process(pid).unwrap();
        assert_eq!(p.state, ProcessState::Done);
        assert_eq!(p.consumed_quanta, 3);
        assert_eq!(s.running(), Some(pid));

        let events = s.step().unwrap();
        assert_eq!(events, vec![SchedEvent::Idle]);
        let p = s.process(pid).unwrap();
        assert_eq!(p.state, ProcessState::Done);
        assert_eq!(p.consumed_quanta, 3);
        assert_eq!(s.running(), None);
        assert_eq!(p.history().len(), 4);
    }

    #[test]
    fn completion_events_are_reported() {
        let mut s = sched(PolicyKind::Fifo);
        s.spawn(TotalQuanta::Finite(1), 1.0).unwrap();
        let events = s.step().unwrap();
        assert_eq!(
            events,
            vec![
                SchedEvent::Dispatched { pid: 1 },
                SchedEvent::Completed { pid: 1 }
            ]
        );
    }

    #[test]
    fn fifo_cycles_in_spawn_order() {
        let mut s = sched(PolicyKind::Fifo);
        for _ in 0..3 {
            s.spawn(TotalQuanta::Finite(2), 1.0).unwrap();
        }
        let order = run_order(&mut s, 7);
        assert_eq!(
            order,
            vec![Some(1), Some(2), Some(3), Some(1), Some(2), Some(3), None]
        );
        assert!(s.all_done());
    }

    #[test]
    fn blocked_process_leaves_ready_set() {
        let mut s = Scheduler::new(PolicyKind::Fifo, Constant(0.9));
        let io = s.spawn(TotalQuanta::Unbounded, 0.5).unwrap();
        let cpu = s.spawn(TotalQuanta::Unbounded, 1.0).unwrap();

        let events = s.step().unwrap();
        assert_eq!(
            events[0],
            SchedEvent::StateChange {
                pid: io,
                from: ProcessState::Ready,
                to: ProcessState::Waiting
            }
        );
        assert_eq!(s.running(), Some(cpu));
        assert!(s.ctx().is_waiting(io));
        assert!(!s.ctx().is_ready(io));
    }

    #[test]
    fn waking_process_rejoins_at_back() {
        // draws per tick: p1, p2
        let draws = vec![0.9, 0.1, 0.1, 0.1];
        let mut s = Scheduler::new(PolicyKind::Fifo, Scripted::new(draws));
        let a = s.spawn(TotalQuanta::Unbounded, 0.5).unwrap();
        let b = s.spawn(TotalQuanta::Unbounded, 0.5).unwrap();

        s.step().unwrap();
        assert_eq!(s.running(), Some(b));
        assert!(s.ctx().is_waiting(a));

        s.step().unwrap();
        assert_eq!(s.ctx().waiting_len(), 0);
        assert_eq!(s.ctx().ready_len(), 1);
        assert_eq!(s.running(), Some(a));
        assert_eq!(s.ctx().ready_ids().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn set_policy_rejects_unknown_name() {
        let mut s = sched(PolicyKind::RoundRobin);
        assert_eq!(
            s.set_policy("lottery"),
            Err(SimError::UnknownPolicy("lottery".to_string()))
        );
        assert_eq!(s.policy(), PolicyKind::RoundRobin);

        s.set_policy("fair-share").unwrap();
        assert_eq!(s.policy(), PolicyKind::FairShare);
        let events = s.step().unwrap();
        assert_eq!(
            events[0],
            SchedEvent::PolicySwitched {
                from: PolicyKind::RoundRobin,
                to: PolicyKind::FairShare
            }
        );
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut s = Scheduler::from_config(&SimConfig {
            history_tail: 2,
            ..SimConfig::default()
        });
        s.spawn(TotalQuanta::Finite(4), 0.7).unwrap();
        s.spawn(TotalQuanta::Unbounded, 0.3).unwrap();
        for _ in 0..5 {
            s.step().unwrap();
        }

        let a = s.snapshot();
        let b = s.snapshot();
        assert_eq!(a, b);
        assert_eq!(a.clock, 5);
        assert!(a.processes.iter().all(|p| p.history_tail.len() == 2));
    }

    struct Rogue;

    impl DispatchPolicy for Rogue {
        fn kind(&self) -> PolicyKind {
            PolicyKind::Fifo
        }

        fn pick(&self, _ctx: &SimCtx, _prev: Option<ProcessId>) -> Option<ProcessId> {
            Some(1)
        }
    }

    #[test]
    fn illegal_pick_fails_without_corrupting_partitions() {
        let mut s = Scheduler::new(PolicyKind::Fifo, Constant(0.9));
        s.spawn(TotalQuanta::Unbounded, 0.5).unwrap();
        s.spawn(TotalQuanta::Unbounded, 1.0).unwrap();
        s.policy = Box::new(Rogue);

        let err = s.step().unwrap_err();
        assert_eq!(
            err,
            SimError::IllegalStateTransition {
                pid: 1,
                from: ProcessState::Waiting,
                action: "dispatch"
            }
        );
        assert_eq!(s.running(), None);
        assert!(s.ctx().is_waiting(1));
        assert_eq!(s.ctx().ready_ids().collect::<Vec<_>>(), vec![2]);
        assert_eq!(s.process(2).unwrap().consumed_quanta, 0);
        assert_eq!(s.process(1).unwrap().history().len(), 1);
    }

    #[test]
    fn failed_step_carries_events_forward() {
        let mut s = Scheduler::new(PolicyKind::RoundRobin, Constant(0.9));
        s.spawn(TotalQuanta::Unbounded, 0.5).unwrap();
        s.spawn(TotalQuanta::Unbounded, 1.0).unwrap();
        s.set_policy_kind(PolicyKind::Fifo);
        s.policy = Box::new(Rogue);

        assert!(s.step().is_err());

        s.policy = PolicyKind::Fifo.build();
        let events = s.step().unwrap();
        assert_eq!(
            events,
            vec![
                SchedEvent::PolicySwitched {
                    from: PolicyKind::RoundRobin,
                    to: PolicyKind::Fifo
                },
                SchedEvent::StateChange {
                    pid: 1,
                    from: ProcessState::Ready,
                    to: ProcessState::Waiting
                },
                SchedEvent::Dispatched { pid: 2 },
            ]
        );
        assert!(
            !s.step()
                .unwrap()
                .iter()
                .any(|e| matches!(e, SchedEvent::PolicySwitched { .. }))
        );
    }

    #[test]
    fn swapped_random_source_drives_next_poll() {
        let mut s = Scheduler::new(PolicyKind::Fifo, Constant(0.1));
        let pid = s.spawn(TotalQuanta::Unbounded, 0.5).unwrap();

        s.step().unwrap();
        assert_eq!(s.process(pid).unwrap().state, ProcessState::Running);

        s.set_random_source(Constant(0.9));
        let events = s.step().unwrap();
        assert_eq!(
            events,
            vec![
                SchedEvent::StateChange {
                    pid,
                    from: ProcessState::Running,
                    to: ProcessState::Waiting
                },
                SchedEvent::Idle,
            ]
        );
        assert_eq!(s.process(pid).unwrap().state, ProcessState::Waiting);
        assert!(s.ctx().is_waiting(pid));

        // 0.4 < 0.5 wakes it, 0.9 would not
        s.set_random_source(Scripted::new(vec![0.4]));
        s.step().unwrap();
        assert_eq!(s.running(), Some(pid));
        assert_eq!(s.observer().steps(), s.now());
    }
}
