use serde::{Deserialize, Serialize};

use crate::persistence::domain::checkpoint_record::CheckpointRecord;
use crate::shared::constants::NOT_FOUND_POSITION;

/// Wire shape: `[keyword_id, keyword, position, score, token]`.
type OccurrenceRow = (usize, String, i64, u8, String);

/// One token of a transcript that matched a keyword.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OccurrenceRow", from = "OccurrenceRow")]
pub struct Occurrence {
    pub keyword_id: usize,
    pub keyword: String,
    /// Character offset of `matched_token` in the transcript text, or `None`
    /// when the literal token could not be found after the cursor.
    pub position: Option<usize>,
    pub score: u8,
    pub matched_token: String,
}

impl From<Occurrence> for OccurrenceRow {
    fn from(o: Occurrence) -> Self {
        let position = o.position.map_or(NOT_FOUND_POSITION, |p| p as i64);
        (o.keyword_id, o.keyword, position, o.score, o.matched_token)
    }
}

impl From<OccurrenceRow> for Occurrence {
    fn from((keyword_id, keyword, position, score, matched_token): OccurrenceRow) -> Self {
        Self {
            keyword_id,
            keyword,
            position: usize::try_from(position).ok(),
            score,
            matched_token,
        }
    }
}

/// Every occurrence found in one transcript, in resolution order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOccurrences {
    pub file: String,
    #[serde(rename = "keywords")]
    pub occurrences: Vec<Occurrence>,
}

impl CheckpointRecord for FileOccurrences {
    fn record_id(&self) -> &str {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn occurrence(position: Option<usize>) -> Occurrence {
        Occurrence {
            keyword_id: 3,
            keyword: "chat".to_string(),
            position,
            score: 100,
            matched_token: "chat".to_string(),
        }
    }

    #[test]
    fn test_serializes_as_row() {
        let value = serde_json::to_value(occurrence(Some(12))).unwrap();
        assert_eq!(value, json!([3, "chat", 12, 100, "chat"]));
    }

    #[test]
    fn test_miss_serializes_as_minus_one() {
        let value = serde_json::to_value(occurrence(None)).unwrap();
        assert_eq!(value[2], json!(-1));
    }

    #[test]
    fn test_minus_one_reads_back_as_miss() {
        let o: Occurrence = serde_json::from_value(json!([0, "chien", -1, 95, "chiens"])).unwrap();
        assert_eq!(o.position, None);
        assert_eq!(o.matched_token, "chiens");
    }

    #[test]
    fn test_file_occurrences_uses_keywords_field() {
        let result = FileOccurrences {
            file: "F:/tv/a.mp4".to_string(),
            occurrences: vec![occurrence(Some(0))],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["file"], "F:/tv/a.mp4");
        assert_eq!(value["keywords"][0][1], "chat");
    }
}
