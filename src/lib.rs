//! Cellflow - File-based processing pipeline for cell response experiment data
//!
//! Cellflow watches a drop directory for raw experiment files and pushes
//! them through three decoupled stages. Stages share no state and never
//! call each other; each one polls a directory, processes whatever it
//! finds, and hands results to the next stage by writing files.
//!
//! ## Data flow
//!
//! ```text
//!                 ┌───────────────┐
//!  raw .json ───▶ │   Extractor   │ ── malformed ──▶ quarantine/
//!  drops          └───────┬───────┘
//!                         │ extracted records
//!                         ▼
//!                 ┌───────────────┐
//!                 │   Validator   │  mean(Neuron/In vivo)
//!                 └───────┬───────┘  vs mean(rest)
//!                         │ verdict files
//!                         ▼
//!                 ┌───────────────┐
//!                 │  Aggregator   │ ──▶ running validity %
//!                 └───────────────┘     (log output)
//! ```
//!
//! A file moves forward only after its successor copy is safely written;
//! every handoff is transform-then-delete, never copy-and-keep. Work the
//! extractor cannot parse is moved to a quarantine directory so it stops
//! consuming scan passes, while the later stages leave failed files in
//! place and retry them on every poll.
//!
//! ## Modules
//!
//! - [`config`]: Directory layout and poll cadence configuration
//! - [`records`]: Wire formats for the three hops plus file helpers
//! - [`pipeline`]: Stage trait, polling runner, and pipeline lifecycle
//! - [`stages`]: The extractor, validator, and aggregator stages

pub mod config;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod stages;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
