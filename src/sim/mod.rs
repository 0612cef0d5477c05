pub mod driver;
pub mod job;
pub mod report;

pub use driver::Sim;
pub use job::{Job, JobId, JobInstance, Workload};
pub use report::SimReport;
