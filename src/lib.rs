//! # piapprox
//!
//! Monte Carlo approximation of π over a fixed pool of worker threads.
//!
//! The quarter circle x² + y² ≤ 1 inside the unit square has area π/4 while
//! the square has area 1. Uniform random points therefore land inside the
//! quarter circle with probability π/4, and
//!
//! ```text
//! π ≈ 4 * (points inside / total points)
//! ```
//!
//! The sample budget is split across workers ([`WorkAssignment`]), every
//! worker draws from its own independently seeded generator ([`Sampler`],
//! [`seed`]), and the [`Coordinator`] joins all of them before summing the
//! hit counts.
//!
//! ```
//! use piapprox::{Backend, Coordinator};
//!
//! let estimate = Coordinator::new(Backend::Rayon).estimate(50_000, 2)?;
//! assert_eq!(estimate.total_trials, 50_000);
//! assert!(estimate.hits <= 50_000);
//! # Ok::<(), piapprox::EstimateError>(())
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod partition;
pub mod report;
pub mod sampler;
pub mod seed;

pub use config::{Backend, ConfigError, LogLevel, OutputFormat, RunConfig};
pub use coordinator::{estimate, Coordinator, Estimate};
pub use error::EstimateError;
pub use partition::{effective_workers, WorkAssignment, MIN_SAMPLES};
pub use sampler::{count_hits, Sampler};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
