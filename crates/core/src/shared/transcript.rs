use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::persistence::domain::checkpoint_record::CheckpointRecord;

/// One transcribed recording as produced by the speech-to-text stage.
///
/// Fields other than `file` and `text` (lemmas, named entities, ...) are kept
/// in `extra` so they survive checkpoint rewrites untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub file: String,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transcript {
    pub fn new(file: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            text: text.into(),
            extra: Map::new(),
        }
    }
}

impl CheckpointRecord for Transcript {
    fn record_id(&self) -> &str {
        &self.file
    }
}
