//! Emitting the FASTA records of selected contigs.
//!
//! Two retrieval strategies are offered:
//!
//! - [`Strategy::Indexed`] reads the whole FASTA once into a keyed index of
//!   the selected records, then writes them in selection order (highest score
//!   first). A selected name missing from the FASTA is an error and nothing is
//!   written.
//! - [`Strategy::Scan`] streams the FASTA and writes each selected record as
//!   it is encountered, in FASTA order. Selected names that never appear are
//!   skipped; their number is returned in [`SelectStats::missing`] and logged
//!   as a warning so the loss is never silent.

use std::io::Write;

use bio::io::fasta;
use clap::ValueEnum;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{error::SeqSiftError, record::Record, table::Selection};

/// How selected records are retrieved from the FASTA source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Index selected records, emit in descending score order.
    #[default]
    Indexed,
    /// Stream the FASTA, emit in input order.
    Scan,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indexed => write!(f, "indexed"),
            Self::Scan => write!(f, "scan"),
        }
    }
}

/// Outcome of a selection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectStats {
    /// Names in the selection.
    pub selected: usize,
    /// Records written.
    pub written: usize,
    /// Selected names not found in the FASTA (scan strategy only).
    pub missing: usize,
}

/// Records keyed by name.
#[derive(Debug, Default)]
pub struct RecordIndex {
    records: FxHashMap<String, Record>,
}

impl RecordIndex {
    /// Indexes the records for which `wanted` returns `true`.
    ///
    /// When a name occurs more than once, the first record wins.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `records`.
    pub fn build<I, F>(records: I, wanted: F) -> Result<Self, SeqSiftError>
    where
        I: IntoIterator<Item = Result<Record, SeqSiftError>>,
        F: Fn(&str) -> bool,
    {
        let mut index = Self::default();
        for record in records {
            let record = record?;
            if wanted(&record.name) {
                index.records.entry(record.name.clone()).or_insert(record);
            }
        }
        Ok(index)
    }

    /// Looks up a record by name.
    ///
    /// # Errors
    ///
    /// Returns [`SeqSiftError::MissingRecord`] if `name` was not indexed.
    pub fn get(&self, name: &str) -> Result<&Record, SeqSiftError> {
        self.records
            .get(name)
            .ok_or_else(|| SeqSiftError::MissingRecord {
                name: name.to_string(),
            })
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Writes the selected records from `records` as FASTA.
///
/// With `annotate`, headers carry `score=<score>;pvalue=<pvalue>;`.
///
/// `open_output` is called once, when writing is about to start: before the
/// pass for [`Strategy::Scan`], after every selected record has been found for
/// [`Strategy::Indexed`]. An indexed run that fails on a missing record
/// therefore never creates its output.
///
/// # Errors
///
/// Returns read errors from `records`, errors from `open_output`, write
/// errors, and with [`Strategy::Indexed`] a [`SeqSiftError::MissingRecord`]
/// for the first selected name (in score order) absent from the FASTA.
pub fn select_records<I, F, W>(
    records: I,
    selection: &Selection,
    strategy: Strategy,
    annotate: bool,
    open_output: F,
) -> Result<SelectStats, SeqSiftError>
where
    I: IntoIterator<Item = Result<Record, SeqSiftError>>,
    F: FnOnce() -> Result<W, SeqSiftError>,
    W: Write,
{
    let stats = match strategy {
        Strategy::Indexed => emit_indexed(records, selection, annotate, open_output)?,
        Strategy::Scan => emit_scanned(records, selection, annotate, open_output)?,
    };

    tracing::info!(
        strategy = %strategy,
        selected = stats.selected,
        written = stats.written,
        missing = stats.missing,
        "Selection written"
    );
    Ok(stats)
}

fn emit_indexed<I, F, W>(
    records: I,
    selection: &Selection,
    annotate: bool,
    open_output: F,
) -> Result<SelectStats, SeqSiftError>
where
    I: IntoIterator<Item = Result<Record, SeqSiftError>>,
    F: FnOnce() -> Result<W, SeqSiftError>,
    W: Write,
{
    let index = RecordIndex::build(records, |name| selection.contains(name))?;
    tracing::debug!(indexed = index.len(), "Indexed selected records");

    // Resolve every name before writing anything.
    let resolved = selection
        .rows()
        .iter()
        .map(|row| index.get(row.contig_name()).map(|record| (row, record)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = fasta::Writer::new(open_output()?);
    for (row, record) in &resolved {
        let annotation = annotate.then(|| row.annotation());
        record.write_fasta(&mut out, annotation.as_deref())?;
    }
    out.flush()?;

    Ok(SelectStats {
        selected: selection.len(),
        written: resolved.len(),
        missing: 0,
    })
}

fn emit_scanned<I, F, W>(
    records: I,
    selection: &Selection,
    annotate: bool,
    open_output: F,
) -> Result<SelectStats, SeqSiftError>
where
    I: IntoIterator<Item = Result<Record, SeqSiftError>>,
    F: FnOnce() -> Result<W, SeqSiftError>,
    W: Write,
{
    let mut out = fasta::Writer::new(open_output()?);
    let mut written = FxHashSet::default();
    for record in records {
        let record = record?;
        let Some(row) = selection.get(&record.name) else {
            continue;
        };
        if !written.insert(record.name.clone()) {
            tracing::debug!(name = %record.name, "skipping repeated contig name");
            continue;
        }
        let annotation = annotate.then(|| row.annotation());
        record.write_fasta(&mut out, annotation.as_deref())?;
    }
    out.flush()?;

    let missing = selection.len() - written.len();
    if missing > 0 {
        tracing::warn!(
            missing,
            "selected contigs were not found in the sequence file"
        );
    }
    Ok(SelectStats {
        selected: selection.len(),
        written: written.len(),
        missing,
    })
}
