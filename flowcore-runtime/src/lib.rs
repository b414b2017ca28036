//! The deterministic tick scheduler: superdense time, the propose/resolve/commit
//! triad, write-policy resolution, delay materialization, and external event injection.
//! Depends on `flowcore-ir` for the IR and evaluators and on `flowcore-analysis` only for
//! its error types' documentation references — this crate trusts that callers only ever
//! hand it an `Ir` that already passed the analysis pipeline.

pub mod env;
pub mod error;
pub mod metrics;
pub mod resolve;
pub mod scheduler;
pub mod tag;

pub use error::{EventTagError, RuntimeError, WritePolicyError, ZenoRuntimeError};
pub use metrics::TickMetrics;
pub use scheduler::{EnvSnapshot, Scheduler};
pub use tag::Tag;
