use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::shared::transcript::Transcript;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Accepted keyword file shapes.
///
/// The keyword-sorting stage emits `{lemma: frequency}` ranked by frequency;
/// hand-curated lists are plain arrays. Object key order is the ranking.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeywordFile {
    List(Vec<String>),
    Ranked(IndexMap<String, serde_json::Value>),
}

/// Loads the ordered keyword list.
pub fn load_keywords(path: &Path) -> Result<Vec<String>, InputError> {
    let keywords = match read_json::<KeywordFile>(path)? {
        KeywordFile::List(list) => list,
        KeywordFile::Ranked(ranked) => ranked.into_keys().collect(),
    };
    log::info!("Loaded {} keywords from {}", keywords.len(), path.display());
    Ok(keywords)
}

/// Loads the transcript collection produced by the transcription stage.
pub fn load_transcripts(path: &Path) -> Result<Vec<Transcript>, InputError> {
    let transcripts: Vec<Transcript> = read_json(path)?;
    log::info!(
        "Loaded {} transcripts from {}",
        transcripts.len(),
        path.display()
    );
    Ok(transcripts)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let json = fs::read_to_string(path).map_err(|e| InputError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&json).map_err(|e| InputError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_keyword_array() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "k.json", r#"["chat", "chien"]"#);
        assert_eq!(load_keywords(&path).unwrap(), vec!["chat", "chien"]);
    }

    #[test]
    fn test_ranked_keyword_object_keeps_key_order() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "k.json", r#"{"zèbre": 12, "abeille": 7, "mouton": 3}"#);
        assert_eq!(
            load_keywords(&path).unwrap(),
            vec!["zèbre", "abeille", "mouton"]
        );
    }

    #[test]
    fn test_invalid_keyword_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "k.json", "[\"chat\",");
        assert!(matches!(
            load_keywords(&path),
            Err(InputError::Parse { .. })
        ));
    }

    #[test]
    fn test_keyword_file_of_wrong_shape_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "k.json", "[1, 2]");
        assert!(load_keywords(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = load_transcripts(Path::new("/nonexistent/transcripts.json"));
        assert!(matches!(result, Err(InputError::Read { .. })));
    }

    #[test]
    fn test_transcripts_with_missing_text() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "t.json",
            r#"[{"file": "F:/a/x.mp4", "text": "Le chat"}, {"file": "F:/b/y.mp4"}]"#,
        );
        let transcripts = load_transcripts(&path).unwrap();
        assert_eq!(transcripts.len(), 2);
        assert_eq!(transcripts[0].text, "Le chat");
        assert!(transcripts[1].text.is_empty());
    }
}
