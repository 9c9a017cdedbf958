use serde::de::DeserializeOwned;
use serde::Serialize;

/// A per-transcript result that can be checkpointed and deduplicated.
///
/// `record_id` is the transcript identifier; a run skips every transcript
/// whose id is already present in the persisted checkpoint.
pub trait CheckpointRecord: Serialize + DeserializeOwned + Clone + Send {
    fn record_id(&self) -> &str;
}
