/// Minimum token-set score for a token to count as a keyword match.
///
/// Calibrated against broadcast transcription noise; lowering it quickly
/// lets inflected forms ("chatte" for "chat") through.
pub const DEFAULT_SCORE_CUTOFF: u8 = 90;

/// Results buffered before the checkpoint is rewritten.
pub const DEFAULT_FLUSH_EVERY: usize = 10;

/// Extra flush attempts before a checkpoint error is surfaced.
pub const DEFAULT_FLUSH_RETRIES: usize = 2;

/// Wire value for an occurrence whose token could not be re-located.
pub const NOT_FOUND_POSITION: i64 = -1;

pub const SPOT_SUFFIX: &str = "spot";
pub const TRANSCRIPT_SUFFIX: &str = "transcript";
