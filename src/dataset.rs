//! Record types and whole-file JSON I/O for inputs and artifacts.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Unique, normalized table names for one record. Sorted so artifacts are stable.
pub type TableSet = BTreeSet<String>;

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One question/SQL pair from the benchmark input.
///
/// `question_id` is kept as raw JSON so integer and string ids both pass
/// through to the artifacts unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub question_id: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub db_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(rename = "SQL", default, deserialize_with = "null_as_default")]
    pub sql: String,
}

/// Ground-truth row written to `output_sql.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlTablesEntry {
    pub question_id: Option<Value>,
    pub db_id: String,
    pub query: String,
    pub tables_extracted: TableSet,
}

/// Prediction row written to `output_llm.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub question_id: Option<Value>,
    pub db_id: String,
    pub question: String,
    pub tables_extracted: TableSet,
}

/// Common view of either artifact as read back by the evaluation stage.
///
/// `tables_extracted` stays optional: hand-edited or partial files may lack it,
/// and such rows are skipped rather than treated as empty predictions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablesEntry {
    #[serde(default)]
    pub question_id: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub db_id: String,
    #[serde(default)]
    pub tables_extracted: Option<TableSet>,
}

/// Load a JSON array (or any JSON document) from disk.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a value as pretty JSON, replacing the whole file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    load_json(path)
}
