//! Streaming deduplication of FASTA/FASTQ records.
//!
//! Records are pulled one at a time and written as soon as their key is seen
//! for the first time, so output order is the input order of first
//! occurrences. Only the set of seen keys is kept in memory.

use std::io::Write;

use bio::io::fasta;
use bytes::Bytes;
use clap::ValueEnum;
use rustc_hash::FxHashSet;

use crate::{error::SeqSiftError, record::Record};

/// Which part of a record identifies a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DedupMode {
    /// Records sharing a name are duplicates.
    #[default]
    Name,
    /// Records sharing an identical sequence are duplicates.
    Sequence,
}

impl std::fmt::Display for DedupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Sequence => write!(f, "sequence"),
        }
    }
}

/// Record counts from a dedup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Records read from the input.
    pub total: u64,
    /// Records written to the output.
    pub emitted: u64,
}

/// Tracks which keys have been seen.
#[derive(Debug, Default)]
pub struct Deduplicator {
    mode: DedupMode,
    names: FxHashSet<String>,
    sequences: FxHashSet<Bytes>,
    stats: DedupStats,
}

impl Deduplicator {
    /// Creates an empty deduplicator for the given mode.
    #[must_use]
    pub fn new(mode: DedupMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Returns `true` if `record` is the first with its key.
    pub fn observe(&mut self, record: &Record) -> bool {
        self.stats.total += 1;
        let first = match self.mode {
            DedupMode::Name if self.names.contains(&record.name) => false,
            DedupMode::Name => self.names.insert(record.name.clone()),
            // `Bytes` clones share the record's buffer.
            DedupMode::Sequence => self.sequences.insert(record.seq.clone()),
        };
        if first {
            self.stats.emitted += 1;
        }
        first
    }

    /// Counts so far.
    #[must_use]
    pub fn stats(&self) -> DedupStats {
        self.stats
    }

    /// Number of distinct keys seen.
    #[must_use]
    pub fn distinct(&self) -> usize {
        match self.mode {
            DedupMode::Name => self.names.len(),
            DedupMode::Sequence => self.sequences.len(),
        }
    }
}

/// Writes the first record of each distinct key as FASTA.
///
/// # Errors
///
/// Returns the first read or write error. Output already written stays
/// written.
pub fn dedup_records<I, W>(
    records: I,
    mode: DedupMode,
    writer: W,
) -> Result<DedupStats, SeqSiftError>
where
    I: IntoIterator<Item = Result<Record, SeqSiftError>>,
    W: Write,
{
    let mut dedup = Deduplicator::new(mode);
    let mut out = fasta::Writer::new(writer);

    for record in records {
        let record = record?;
        if dedup.observe(&record) {
            record.write_fasta(&mut out, None)?;
        }
    }
    out.flush()?;

    let stats = dedup.stats();
    tracing::info!(
        mode = %mode,
        total = stats.total,
        emitted = stats.emitted,
        "Deduplication complete"
    );
    Ok(stats)
}
