pub mod driver;
pub mod event;
pub mod observer;
pub mod process;
pub mod random;
pub mod snapshot;
pub mod state;

pub use driver::Scheduler;
pub use event::SchedEvent;
pub use process::{Process, Transition};
pub use random::{Constant, RandomSource, Scripted};
pub use snapshot::{ProcessView, SimulationSnapshot};
pub use state::{ProcessId, ProcessState, SimCtx, Ticks, TotalQuanta};
