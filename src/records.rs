//! Record types flowing through the pipeline
//!
//! Every stage exchanges UTF-8 JSON files whose top level is an ordered
//! array of records. Field names here are the wire names; responses are
//! carried as [`serde_json::Number`] so integer values written by the
//! acquisition software come back out as integers.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named attribute of a raw observation, e.g. `{"name": "Neuron"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
}

/// One raw observation as produced by the acquisition software.
///
/// Only the three fields the pipeline needs are deserialized; any extra
/// fields in the raw document are ignored. A record missing one of them,
/// or carrying the wrong type, fails the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub cell_type: NamedValue,
    pub environment: NamedValue,
    pub cell_response: serde_json::Number,
}

/// Flattened projection of a [`RawRecord`], one file per experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub cell_type: String,
    pub environment: String,
    pub cell_response: serde_json::Number,
}

impl From<RawRecord> for ExtractedRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            cell_type: raw.cell_type.name,
            environment: raw.environment.name,
            cell_response: raw.cell_response,
        }
    }
}

/// Boolean outcome of hypothesis validation for one experiment file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub hypothesis_valid: bool,
}

/// Read a JSON file containing an ordered sequence of records.
pub async fn load_sequence<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let data = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&data)?)
}

/// Write an ordered sequence of records as pretty-printed JSON.
pub async fn save_sequence<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
