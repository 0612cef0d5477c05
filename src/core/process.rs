use super::{
    random::RandomSource,
    state::{ProcessId, ProcessState, Ticks, TotalQuanta},
};
use crate::error::{Result, SimError};

#[derive(Debug, Clone)]
pub struct Process {
    pub id: ProcessId,
    pub state: ProcessState,
    pub total_quanta: TotalQuanta,
    pub consumed_quanta: u64,
    pub cpu_utilization: f64,
    // Only advanced by the fair-share policy
    pub fair_share_time: u64,
    pub spawned_at: Ticks,
    history: Vec<ProcessState>,
}

/// Result of polling a process once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ProcessState,
    pub to: ProcessState,
}

impl Transition {
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

impl Process {
    pub(crate) fn new(
        id: ProcessId,
        total_quanta: TotalQuanta,
        cpu_utilization: f64,
        spawned_at: Ticks,
    ) -> Self {
        Self {
            id,
            state: ProcessState::Ready,
            total_quanta,
            consumed_quanta: 0,
            cpu_utilization,
            fair_share_time: 0,
            spawned_at,
            history: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ProcessState::Done
    }

    pub fn remaining_quanta(&self) -> Option<u64> {
        self.total_quanta
            .finite()
            .map(|total| total.saturating_sub(self.consumed_quanta))
    }

    /// Applies one tick of the I/O model. Done processes are left untouched.
    pub(crate) fn poll(&mut self, random: &mut dyn RandomSource) -> Transition {
        let from = self.state;
        if from == ProcessState::Done {
            return Transition { from, to: from };
        }

        if self.total_quanta.is_exhausted_by(self.consumed_quanta) {
            self.state = ProcessState::Done;
            return Transition {
                from,
                to: self.state,
            };
        }

        let r = random.next_f64();
        self.state = match from {
            ProcessState::Waiting if r < self.cpu_utilization => ProcessState::Ready,
            ProcessState::Waiting => ProcessState::Waiting,
            _ if r > self.cpu_utilization => ProcessState::Waiting,
            _ => ProcessState::Ready,
        };

        Transition {
            from,
            to: self.state,
        }
    }

    /// Executes one quantum. Only a Ready process may run.
    pub(crate) fn run(&mut self) -> Result<ProcessState> {
        if self.state != ProcessState::Ready {
            return Err(SimError::IllegalStateTransition {
                pid: self.id,
                from: self.state,
                action: "run",
            });
        }

        self.consumed_quanta += 1;
        self.state = if self.total_quanta.is_exhausted_by(self.consumed_quanta) {
            ProcessState::Done
        } else {
            ProcessState::Running
        };
        Ok(self.state)
    }

    pub(crate) fn record(&mut self) {
        self.history.push(self.state);
    }

    pub fn history(&self) -> &[ProcessState] {
        &self.history
    }

    pub fn history_tail(&self, len: usize) -> &[ProcessState] {
        let start = self.history.len().saturating_sub(len);
        &self.history[start..]
    }
}
