//! Simulation engine plumbing shared by every run.
//!
//! - Deterministic RNG (PCG with partitioned streams, one per run)
//! - Jidoka guards that stop a run on a corrupted transition row
//! - Work-stealing scheduler for running independent runs in parallel

pub mod jidoka;
pub mod rng;
pub mod scheduler;

pub use jidoka::{DistributionGuard, GuardConfig, ViolationSeverity};
pub use rng::SimRng;
pub use scheduler::WorkStealingScheduler;
