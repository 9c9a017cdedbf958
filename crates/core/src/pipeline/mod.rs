pub mod batch_executor;
pub mod count_corpus_use_case;
pub mod infrastructure;
pub mod run_logger;
pub mod run_report;
pub mod split_transcripts_use_case;
pub mod spot_occurrences_use_case;
