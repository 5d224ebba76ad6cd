//! Command runners.
//!
//! Each runner takes a validated configuration from [`config`](crate::config),
//! opens its inputs, drives the engine and creates its output. Inputs are
//! always opened before the output file is created, so a failed load never
//! leaves an empty output behind.

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::{
    config::{DedupConfig, DerepConfig, SelectConfig},
    dedup::{dedup_records, DedupStats},
    derep::{dereplicate, write_clusters, Cluster},
    error::SeqSiftError,
    input::Input,
    progress::{Progress, ProgressTracker},
    reader::{count_headers, read_input},
    select::{select_records, SelectStats},
    table::{ScoreTable, Selection},
};

/// Streams the configured input through the deduplicator into `writer`.
///
/// # Errors
///
/// Returns [`SeqSiftError::SequenceRead`] if the input cannot be read, or a
/// write error.
pub fn run_dedup<W: Write>(config: &DedupConfig, writer: W) -> Result<DedupStats, SeqSiftError> {
    let records = read_input(&config.input)?;
    dedup_records(records, config.mode, writer)
}

/// Number of FASTA records in `input`, counted with a quick pre-pass.
///
/// Returns `None` for stdin, which cannot be read twice, or if the pre-pass
/// fails. The main pass reports that failure properly.
#[must_use]
pub fn expected_records(input: &Input) -> Option<u64> {
    if input.is_stdin() {
        return None;
    }
    let reader = input.open().ok()?;
    match count_headers(reader) {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::debug!(input = %input, error = %e, "Could not count records");
            None
        }
    }
}

/// Clusters produced by [`derep_clusters`] and the time the pass took.
#[derive(Debug, Clone)]
pub struct DerepPass {
    pub clusters: Vec<Cluster>,
    pub records: u64,
    pub elapsed: Duration,
}

/// Summary of a complete [`run_derep`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerepReport {
    pub records: u64,
    pub unique: usize,
    pub output: PathBuf,
    pub dedup_elapsed: Duration,
}

/// Reads and dereplicates the whole input, reporting progress.
///
/// `total` is the expected record count, usually from [`expected_records`].
///
/// # Errors
///
/// Returns [`SeqSiftError::SequenceRead`] if the input cannot be read.
pub fn derep_clusters<F>(
    config: &DerepConfig,
    total: Option<u64>,
    on_progress: F,
) -> Result<DerepPass, SeqSiftError>
where
    F: FnMut(Progress),
{
    tracing::info!(input = %config.input, expected = ?total, "Dereplicating");

    let start = Instant::now();
    let tracker = ProgressTracker::new(total).with_interval(config.progress_every);
    let clusters = dereplicate(read_input(&config.input)?, tracker, on_progress)?;
    let records = clusters.iter().map(|c| c.size).sum();

    Ok(DerepPass {
        clusters,
        records,
        elapsed: start.elapsed(),
    })
}

/// Creates `path` and writes `clusters` to it.
///
/// # Errors
///
/// Returns [`SeqSiftError::OutputCreate`] if the file cannot be created, or
/// a write error.
pub fn write_derep_output(path: &Path, clusters: &[Cluster]) -> Result<(), SeqSiftError> {
    let file = create_output(path)?;
    write_clusters(clusters, file)?;
    tracing::info!(output = %path.display(), clusters = clusters.len(), "Wrote output");
    Ok(())
}

/// Dereplicates the configured input into the configured output file.
///
/// # Errors
///
/// See [`derep_clusters`] and [`write_derep_output`].
pub fn run_derep<F>(config: &DerepConfig, on_progress: F) -> Result<DerepReport, SeqSiftError>
where
    F: FnMut(Progress),
{
    let total = expected_records(&config.input);
    let pass = derep_clusters(config, total, on_progress)?;
    write_derep_output(&config.output, &pass.clusters)?;
    Ok(DerepReport {
        records: pass.records,
        unique: pass.clusters.len(),
        output: config.output.clone(),
        dedup_elapsed: pass.elapsed,
    })
}

/// Loads the score table, selects contigs and writes them.
///
/// Output goes to the configured file, or stdout when none is set.
///
/// # Errors
///
/// In order of the stage that fails: table errors (exit code 1), sequence
/// read errors (4), [`SeqSiftError::OutputCreate`] (7), then
/// [`SeqSiftError::MissingRecord`] or write errors.
pub fn run_select(config: &SelectConfig) -> Result<SelectStats, SeqSiftError> {
    let output = config.output.clone();
    run_select_with(config, move || -> Result<Box<dyn Write>, SeqSiftError> {
        match output {
            Some(path) => Ok(Box::new(create_output(&path)?)),
            None => Ok(Box::new(io::stdout().lock())),
        }
    })
}

/// Like [`run_select`], writing wherever `open_output` points.
///
/// # Errors
///
/// See [`run_select`].
pub fn run_select_with<F, W>(config: &SelectConfig, open_output: F) -> Result<SelectStats, SeqSiftError>
where
    F: FnOnce() -> Result<W, SeqSiftError>,
    W: Write,
{
    let table = ScoreTable::load(&config.table, config.delimiter)?;
    tracing::debug!(rows = table.len(), table = %config.table, "Loaded score table");

    let selection = Selection::new(table, &config.thresholds);
    let records = read_input(&config.contigs)?;
    select_records(
        records,
        &selection,
        config.strategy,
        config.annotate,
        open_output,
    )
}

fn create_output(path: &Path) -> Result<File, SeqSiftError> {
    File::create(path).map_err(|source| SeqSiftError::OutputCreate {
        source,
        path: path.to_path_buf(),
    })
}
