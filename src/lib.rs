pub mod config;
pub mod core;
pub mod error;
pub mod policy;
pub mod sim;

pub use config::{ProcessConfig, SimConfig};
pub use crate::core::{
    ProcessId, ProcessState, SchedEvent, Scheduler, SimulationSnapshot, Ticks, TotalQuanta,
};
pub use error::{Result, SimError};
pub use policy::{DispatchPolicy, PolicyKind};
pub use sim::{Job, Sim, SimReport};
