//! # seqsift
//!
//! Small, streaming tools for FASTA/FASTQ files:
//!
//! - [`dedup`]: print the first record for each name or sequence.
//! - [`derep`]: collapse identical sequences into `name;size=N;` records.
//! - [`select`]: pull the contigs that pass score, p-value and length
//!   thresholds in a VirFinder-style table ([`table`]).
//!
//! All output is FASTA. FASTQ input is accepted everywhere and its quality
//! lines are dropped on output.
//!
//! ## Library usage
//!
//! ```rust
//! use seqsift::dedup::{dedup_records, DedupMode};
//! use seqsift::reader::records_from;
//!
//! let input = b">a\nACGT\n>b\nACGT\n>c\nTTTT\n";
//! let mut out = Vec::new();
//! let stats = dedup_records(records_from(&input[..], "reads.fa"), DedupMode::Sequence, &mut out)?;
//!
//! assert_eq!(stats.emitted, 2);
//! assert_eq!(out, b">a\nACGT\n>c\nTTTT\n");
//! # Ok::<(), seqsift::error::SeqSiftError>(())
//! ```
//!
//! ## Features
//!
//! - `gzip`: transparently decompress inputs ending in `.gz`.

pub mod cli;
pub mod config;
pub mod dedup;
pub mod derep;
pub mod error;
pub mod input;
pub mod logging;
pub mod progress;
pub mod reader;
pub mod record;
pub mod run;
pub mod select;
pub mod table;

pub use error::SeqSiftError;
pub use record::Record;
