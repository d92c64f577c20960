//! Agent that publishes host memory utilization to Zenoh.
//!
//! Every period the agent samples host memory and publishes one batch of
//! three metrics (`MemoryUtilization`, `MemoryUsed`, `MemoryAvailable`),
//! tagged with the configured host dimensions.
//!
//! # Key Expressions
//!
//! ```text
//! memsight/<namespace>/<hostname>     metric batches
//! memsight/@/status                   agent status
//! ```

pub mod args;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod grace;
#[cfg(target_os = "linux")]
pub mod linux;
pub mod publisher;
pub mod runner;
pub mod sampler;
pub mod scheduler;
pub mod sink;
pub mod status;
pub mod units;
