use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;
use std::ops::RangeInclusive;

use super::process::Process;

// Process ids start at 1; slot in `processes` is id - 1
pub type ProcessId = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    Ready,
    Running,
    Waiting,
    Done,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Waiting => "WAITING",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Number of quanta a process needs before it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalQuanta {
    Finite(u64),
    Unbounded,
}

impl TotalQuanta {
    pub fn is_exhausted_by(self, consumed: u64) -> bool {
        match self {
            Self::Finite(total) => consumed >= total,
            Self::Unbounded => false,
        }
    }

    pub fn finite(self) -> Option<u64> {
        match self {
            Self::Finite(total) => Some(total),
            Self::Unbounded => None,
        }
    }
}

impl From<u64> for TotalQuanta {
    fn from(total: u64) -> Self {
        Self::Finite(total)
    }
}

impl fmt::Display for TotalQuanta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(total) => write!(f, "{total}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Everything the scheduler owns: the clock, the roster and the ready/waiting
/// partitions. Policies get a shared borrow of this when picking.
#[derive(Debug)]
pub struct SimCtx {
    pub(crate) now: Ticks,
    pub(crate) processes: Vec<Process>,
    pub(crate) ready: VecDeque<ProcessId>,
    pub(crate) waiting: FxHashSet<ProcessId>,
    pub(crate) running: Option<ProcessId>,

    // Increment upon process creation
    next_pid: ProcessId,
}

impl SimCtx {
    pub fn new() -> Self {
        Self {
            now: 0,
            processes: Vec::new(),
            ready: VecDeque::new(),
            waiting: FxHashSet::default(),
            running: None,
            next_pid: 1,
        }
    }

    pub(crate) fn create_process(
        &mut self,
        total_quanta: TotalQuanta,
        cpu_utilization: f64,
    ) -> ProcessId {
        let id = self.next_pid;
        self.next_pid += 1;

        debug_assert_eq!(self.processes.len() + 1, id, "ProcessId must match slot + 1");
        self.processes
            .push(Process::new(id, total_quanta, cpu_utilization, self.now));

        id
    }

    pub(crate) fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn get(&self, pid: ProcessId) -> Option<&Process> {
        pid.checked_sub(1).and_then(|slot| self.processes.get(slot))
    }

    pub(crate) fn process(&self, pid: ProcessId) -> &Process {
        &self.processes[pid - 1]
    }

    pub(crate) fn process_mut(&mut self, pid: ProcessId) -> &mut Process {
        &mut self.processes[pid - 1]
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    // Detached from &self so callers can mutate while iterating
    pub fn pids(&self) -> RangeInclusive<ProcessId> {
        1..=self.processes.len()
    }

    /// Ready processes, oldest enqueue first.
    pub fn ready_ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.ready.iter().copied()
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_ready(&self, pid: ProcessId) -> bool {
        self.ready.contains(&pid)
    }

    pub fn is_waiting(&self, pid: ProcessId) -> bool {
        self.waiting.contains(&pid)
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn running(&self) -> Option<ProcessId> {
        self.running
    }

    pub(crate) fn push_ready(&mut self, pid: ProcessId) {
        debug_assert!(!self.is_ready(pid), "Process {pid} already present in ready set");
        debug_assert!(!self.is_waiting(pid), "Process {pid} enqueued while still waiting");
        self.ready.push_back(pid);
    }

    pub(crate) fn remove_ready(&mut self, pid: ProcessId) -> bool {
        match self.ready.iter().position(|&p| p == pid) {
            Some(pos) => {
                self.ready.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn insert_waiting(&mut self, pid: ProcessId) {
        debug_assert!(!self.is_ready(pid), "Blocking process {pid} that is still ready");
        self.waiting.insert(pid);
    }

    pub(crate) fn remove_waiting(&mut self, pid: ProcessId) -> bool {
        self.waiting.remove(&pid)
    }

    pub(crate) fn record_history(&mut self) {
        for process in &mut self.processes {
            process.record();
        }
    }
}

impl Default for SimCtx {
    fn default() -> Self {
        Self::new()
    }
}
