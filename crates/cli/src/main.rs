use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use keyspot_core::corpus::domain::corpus_aggregator::CorpusAggregator;
use keyspot_core::corpus::domain::keyword_counts::TranscriptCounts;
use keyspot_core::matching::domain::fuzzy_matcher::FuzzyMatcher;
use keyspot_core::matching::domain::keyword_index::KeywordIndex;
use keyspot_core::matching::domain::occurrence::FileOccurrences;
use keyspot_core::matching::domain::occurrence_resolver::{CursorPolicy, OccurrenceResolver};
use keyspot_core::persistence::domain::checkpoint_record::CheckpointRecord;
use keyspot_core::persistence::domain::checkpoint_writer::CheckpointWriter;
use keyspot_core::persistence::domain::output_layout::OutputLayout;
use keyspot_core::persistence::infrastructure::json_file_store::{write_json_atomic, JsonFileStore};
use keyspot_core::persistence::infrastructure::json_input_loader::{load_keywords, load_transcripts};
use keyspot_core::persistence::infrastructure::mirrored_json_writer::MirroredJsonWriter;
use keyspot_core::pipeline::batch_executor::BatchExecutor;
use keyspot_core::pipeline::count_corpus_use_case::CountCorpusUseCase;
use keyspot_core::pipeline::infrastructure::sequential_batch_executor::SequentialBatchExecutor;
use keyspot_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use keyspot_core::pipeline::run_logger::StdoutRunLogger;
use keyspot_core::pipeline::split_transcripts_use_case::SplitTranscriptsUseCase;
use keyspot_core::pipeline::spot_occurrences_use_case::SpotOccurrencesUseCase;
use keyspot_core::shared::constants::{SPOT_SUFFIX, TRANSCRIPT_SUFFIX};
use keyspot_core::shared::engine_config::EngineConfig;

/// Fuzzy keyword spotting over transcript collections.
#[derive(Parser)]
#[command(name = "keyspot")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate keyword occurrences and write one result file per transcript.
    Spot {
        #[command(flatten)]
        input: MatchInput,

        /// Root directory for per-transcript result files.
        #[arg(long)]
        output_root: PathBuf,

        /// Checkpoint file (default: spot_checkpoint.json under the output root).
        #[arg(long)]
        checkpoint: Option<PathBuf>,
    },
    /// Count keyword matches over the whole collection.
    Count {
        #[command(flatten)]
        input: MatchInput,

        /// JSON file receiving the keyword → count map.
        #[arg(long)]
        output: PathBuf,

        /// Checkpoint file (default: next to the output, with a .checkpoint.json suffix).
        #[arg(long)]
        checkpoint: Option<PathBuf>,
    },
    /// Write each transcript record to its own file.
    Split {
        /// Transcript collection (JSON array of {file, text, ...}).
        #[arg(long)]
        transcripts: PathBuf,

        /// Root directory for the split files.
        #[arg(long)]
        output_root: PathBuf,
    },
}

#[derive(Args)]
struct MatchInput {
    /// Transcript collection (JSON array of {file, text, ...}).
    #[arg(long)]
    transcripts: PathBuf,

    /// Keyword list: JSON array, or object whose keys are ranked keywords.
    #[arg(long)]
    keywords: PathBuf,

    #[command(flatten)]
    tuning: Tuning,
}

/// Overrides for values otherwise taken from `--config` or the defaults.
#[derive(Args)]
struct Tuning {
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum match score (0-100, default 90).
    #[arg(long)]
    cutoff: Option<u8>,

    /// Only use the first N keywords of the list.
    #[arg(long)]
    top_n: Option<usize>,

    /// Cursor policy for locating occurrences.
    #[arg(long, value_enum)]
    cursor: Option<CursorArg>,

    /// Results buffered between checkpoint writes (default 10).
    #[arg(long)]
    flush_every: Option<usize>,

    /// Worker threads (default: one per core; 1 runs sequentially).
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CursorArg {
    Shared,
    PerKeyword,
}

impl From<CursorArg> for CursorPolicy {
    fn from(arg: CursorArg) -> Self {
        match arg {
            CursorArg::Shared => CursorPolicy::Shared,
            CursorArg::PerKeyword => CursorPolicy::PerKeyword,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Spot {
            input,
            output_root,
            checkpoint,
        } => {
            let checkpoint =
                checkpoint.unwrap_or_else(|| output_root.join("spot_checkpoint.json"));
            run_spot(&input, &output_root, &checkpoint)
        }
        Command::Count {
            input,
            output,
            checkpoint,
        } => {
            let checkpoint =
                checkpoint.unwrap_or_else(|| output.with_extension("checkpoint.json"));
            run_count(&input, &output, &checkpoint)
        }
        Command::Split {
            transcripts,
            output_root,
        } => run_split(&transcripts, &output_root),
    }
}

fn run_spot(
    input: &MatchInput,
    output_root: &Path,
    checkpoint_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&input.tuning)?;
    let keywords = KeywordIndex::new(load_keywords(&input.keywords)?);
    let transcripts = load_transcripts(&input.transcripts)?;

    let resolver = OccurrenceResolver::new(
        keywords,
        FuzzyMatcher::new(config.cutoff),
        config.top_n,
        config.cursor_policy,
    );
    let writer = MirroredJsonWriter::new(OutputLayout::new(output_root, SPOT_SUFFIX));
    let checkpoint = checkpoint_writer::<FileOccurrences>(checkpoint_path, &config);

    let mut use_case = SpotOccurrencesUseCase::new(
        resolver,
        Box::new(writer),
        checkpoint,
        build_executor(config.workers),
        Box::new(StdoutRunLogger::default()),
        None,
    );
    let report = use_case.execute(transcripts)?;
    log::info!("{report}");
    log::info!("Results written under {}", output_root.display());
    Ok(())
}

fn run_count(
    input: &MatchInput,
    output: &Path,
    checkpoint_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&input.tuning)?;
    if config.top_n.is_some() || config.cursor_policy != CursorPolicy::default() {
        log::warn!("--top-n and --cursor only apply to `spot`; ignoring");
    }
    let keywords = KeywordIndex::new(load_keywords(&input.keywords)?);
    let transcripts = load_transcripts(&input.transcripts)?;

    let aggregator = CorpusAggregator::new(keywords, FuzzyMatcher::new(config.cutoff));
    let checkpoint = checkpoint_writer::<TranscriptCounts>(checkpoint_path, &config);

    let mut use_case = CountCorpusUseCase::new(
        aggregator,
        checkpoint,
        build_executor(config.workers),
        Box::new(StdoutRunLogger::default()),
        None,
    );
    let (counts, report) = use_case.execute(transcripts)?;
    write_json_atomic(output, &counts)?;
    log::info!("{report}");
    log::info!(
        "{} matches across {} keywords written to {}",
        counts.total(),
        counts.iter().count(),
        output.display()
    );
    Ok(())
}

fn run_split(transcripts: &Path, output_root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let transcripts = load_transcripts(transcripts)?;
    let writer = MirroredJsonWriter::new(OutputLayout::new(output_root, TRANSCRIPT_SUFFIX));
    let mut use_case =
        SplitTranscriptsUseCase::new(Box::new(writer), Box::new(StdoutRunLogger::default()));
    let report = use_case.execute(&transcripts)?;
    log::info!("{report}");
    Ok(())
}

/// File values first, then flag overrides, then validation.
fn resolve_config(tuning: &Tuning) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = match &tuning.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(cutoff) = tuning.cutoff {
        config.cutoff = cutoff;
    }
    if tuning.top_n.is_some() {
        config.top_n = tuning.top_n;
    }
    if let Some(cursor) = tuning.cursor {
        config.cursor_policy = cursor.into();
    }
    if let Some(flush_every) = tuning.flush_every {
        config.flush_every = flush_every;
    }
    if tuning.workers.is_some() {
        config.workers = tuning.workers;
    }
    config.validate()?;
    Ok(config)
}

fn checkpoint_writer<T: CheckpointRecord + 'static>(
    path: &Path,
    config: &EngineConfig,
) -> CheckpointWriter<T> {
    log::info!("Checkpoint: {}", path.display());
    CheckpointWriter::new(
        Box::new(JsonFileStore::<T>::new(path)),
        config.flush_every,
        config.max_retries,
    )
}

fn build_executor<R: Send + 'static>(workers: Option<usize>) -> Box<dyn BatchExecutor<R>> {
    if workers == Some(1) {
        Box::new(SequentialBatchExecutor::new())
    } else {
        let executor = ThreadedBatchExecutor::new(workers);
        log::info!("Using {} worker threads", executor.workers());
        Box::new(executor)
    }
}
