//! Pipeline stages
//!
//! Each stage owns one hop of the data flow: extractor projects raw
//! experiment files, validator turns extracted files into verdicts, and
//! aggregator folds verdicts into a running tally.

mod aggregator;
mod extractor;
mod validator;

pub use aggregator::Aggregator;
pub use extractor::Extractor;
pub use validator::{hypothesis_holds, Validator};
