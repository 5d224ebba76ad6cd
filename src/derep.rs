//! Abundance dereplication.
//!
//! Collapses records with identical sequences into one cluster per sequence.
//! Each cluster keeps the name of its first member and the number of records
//! that shared the sequence, written in the `name;size=N;` header style read
//! by clustering tools.
//!
//! Unlike [`dedup`](crate::dedup), nothing is written until the whole input
//! has been consumed.
//!
//! # Example
//!
//! ```rust
//! use seqsift::derep::Dereplicator;
//! use seqsift::record::Record;
//!
//! let mut derep = Dereplicator::new();
//! derep.add(Record::fasta("A", "ACGT"));
//! derep.add(Record::fasta("B", "ACGT"));
//!
//! let clusters = derep.finish();
//! assert_eq!(clusters.len(), 1);
//! assert_eq!(clusters[0].header(), "A;size=2;");
//! ```

use std::io::{self, Write};

use bio::io::fasta;
use bytes::Bytes;
use rustc_hash::FxHashMap;

use crate::{
    error::SeqSiftError,
    progress::{Progress, ProgressTracker},
    record::Record,
};

/// A unique sequence with its representative name and abundance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Name of the first record carrying this sequence.
    pub name: String,
    /// The shared sequence.
    pub seq: Bytes,
    /// Number of input records with this sequence.
    pub size: u64,
}

impl Cluster {
    /// Header with the abundance annotation, e.g. `seq1;size=3;`.
    ///
    /// Other `;`-delimited fields already in the name are not inspected.
    #[must_use]
    pub fn header(&self) -> String {
        format!("{};size={};", self.name, self.size)
    }
}

/// Accumulates clusters in first-seen order.
#[derive(Debug, Default)]
pub struct Dereplicator {
    index: FxHashMap<Bytes, usize>,
    clusters: Vec<Cluster>,
    records: u64,
}

impl Dereplicator {
    /// Creates an empty dereplicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, returning `true` if its sequence is new.
    pub fn add(&mut self, record: Record) -> bool {
        self.records += 1;
        if let Some(&i) = self.index.get(&record.seq) {
            self.clusters[i].size += 1;
            return false;
        }
        self.index.insert(record.seq.clone(), self.clusters.len());
        self.clusters.push(Cluster {
            name: record.name,
            seq: record.seq,
            size: 1,
        });
        true
    }

    /// Records added so far.
    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Unique sequences so far.
    #[must_use]
    pub fn unique(&self) -> usize {
        self.clusters.len()
    }

    /// Consumes the dereplicator, returning clusters in first-seen order.
    #[must_use]
    pub fn finish(self) -> Vec<Cluster> {
        self.clusters
    }
}

/// Dereplicates a record stream, reporting progress through a callback.
///
/// `on_progress` is invoked every time `tracker` decides a report is due.
///
/// # Errors
///
/// Returns the first read error from `records`.
pub fn dereplicate<I, F>(
    records: I,
    mut tracker: ProgressTracker,
    mut on_progress: F,
) -> Result<Vec<Cluster>, SeqSiftError>
where
    I: IntoIterator<Item = Result<Record, SeqSiftError>>,
    F: FnMut(Progress),
{
    let mut derep = Dereplicator::new();
    for record in records {
        derep.add(record?);
        if let Some(progress) = tracker.record() {
            on_progress(progress);
        }
    }
    on_progress(tracker.snapshot());

    tracing::info!(
        records = derep.records(),
        unique = derep.unique(),
        "Dereplication complete"
    );
    Ok(derep.finish())
}

/// Writes clusters as FASTA with abundance-annotated headers.
///
/// # Errors
///
/// Returns any write error.
pub fn write_clusters<W: Write>(clusters: &[Cluster], writer: W) -> io::Result<()> {
    let mut out = fasta::Writer::new(writer);
    for cluster in clusters {
        out.write(&cluster.header(), None, &cluster.seq)?;
    }
    out.flush()
}
