//! Error types for seqsift.
//!
//! Every fallible operation in the library returns [`SeqSiftError`]. Variants
//! carry the offending path where one exists so the binary can print a useful
//! message, and [`SeqSiftError::exit_code`] maps each variant to the process
//! exit status used by the command-line tools.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for a score table that cannot be loaded.
pub const EXIT_TABLE: i32 = 1;
/// Exit status for a sequence file that cannot be opened.
pub const EXIT_SEQUENCE: i32 = 4;
/// Exit status for an output file that cannot be created.
pub const EXIT_OUTPUT: i32 = 7;
/// Exit status for every other failure.
pub const EXIT_FAILURE: i32 = 1;

/// Errors that can occur in seqsift operations.
#[derive(Debug, Error)]
pub enum SeqSiftError {
    /// Failed to open or read a FASTA/FASTQ file.
    #[error("unable to read sequence file '{path}': {source}")]
    SequenceRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to open or read a score table.
    #[error("unable to open table file '{path}': {source}")]
    TableRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// A score table row could not be parsed.
    #[error("unable to parse table file '{path}': {source}")]
    Table {
        #[source]
        source: csv::Error,
        path: PathBuf,
    },

    /// A required column is absent from the score table header.
    #[error("table file '{path}' has no '{column}' column")]
    MissingColumn { column: &'static str, path: PathBuf },

    /// Failed to create the output file.
    #[error("unable to write to output file '{path}': {source}")]
    OutputCreate {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// A selected name has no record in the sequence file.
    #[error("contig '{name}' is selected but absent from the sequence file")]
    MissingRecord { name: String },

    /// A filter threshold is out of range.
    #[error("invalid {name} {value}: {reason}")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A table delimiter that is not a single ASCII character.
    #[error("invalid table delimiter '{delimiter}': must be an ASCII character")]
    InvalidDelimiter { delimiter: char },

    /// An output path could not be derived from the input.
    #[error("cannot derive an output name from '{input}'; pass --output")]
    OutputName { input: String },

    /// Failed to write output.
    #[error("failed to write output: {source}")]
    WriteError {
        #[source]
        source: std::io::Error,
    },
}

impl SeqSiftError {
    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::TableRead { .. } | Self::Table { .. } | Self::MissingColumn { .. } => EXIT_TABLE,
            Self::SequenceRead { .. } => EXIT_SEQUENCE,
            Self::OutputCreate { .. } => EXIT_OUTPUT,
            Self::MissingRecord { .. }
            | Self::InvalidThreshold { .. }
            | Self::InvalidDelimiter { .. }
            | Self::OutputName { .. }
            | Self::WriteError { .. } => EXIT_FAILURE,
        }
    }
}

impl From<std::io::Error> for SeqSiftError {
    fn from(source: std::io::Error) -> Self {
        SeqSiftError::WriteError { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_display() {
        let err = SeqSiftError::MissingColumn {
            column: "pvalue",
            path: PathBuf::from("scores.csv"),
        };
        assert_eq!(
            err.to_string(),
            "table file 'scores.csv' has no 'pvalue' column"
        );
    }

    #[test]
    fn exit_codes_follow_failure_stage() {
        let table = SeqSiftError::MissingColumn {
            column: "score",
            path: PathBuf::from("t.csv"),
        };
        let fasta = SeqSiftError::SequenceRead {
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
            path: PathBuf::from("contigs.fa"),
        };
        let output = SeqSiftError::OutputCreate {
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            path: PathBuf::from("/out.fa"),
        };
        assert_eq!(table.exit_code(), 1);
        assert_eq!(fasta.exit_code(), 4);
        assert_eq!(output.exit_code(), 7);
    }

    #[test]
    fn io_error_converts_to_write_error() {
        let err: SeqSiftError = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert!(matches!(err, SeqSiftError::WriteError { .. }));
    }
}
