//! Per-command configuration.
//!
//! Each subcommand's arguments are validated once into a plain value that is
//! handed to [`run`](crate::run). Library callers can build these directly.

use std::path::{Path, PathBuf};

use crate::{
    cli::{DedupArgs, DerepArgs, SelectArgs},
    dedup::DedupMode,
    error::SeqSiftError,
    input::Input,
    select::Strategy,
    table::{delimiter_for, Thresholds},
};

/// Prefix of the default dereplication output file name.
pub const DEREP_PREFIX: &str = "derep_";

/// Settings for streaming dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupConfig {
    pub input: Input,
    pub mode: DedupMode,
}

impl From<&DedupArgs> for DedupConfig {
    fn from(args: &DedupArgs) -> Self {
        Self {
            input: Input::from_path(&args.fasta),
            mode: if args.by_seq {
                DedupMode::Sequence
            } else {
                DedupMode::Name
            },
        }
    }
}

/// Settings for abundance dereplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerepConfig {
    pub input: Input,
    pub output: PathBuf,
    pub progress_every: u64,
}

impl DerepConfig {
    /// Builds a config writing to `output`, or to `derep_<name>` next to the
    /// input when `output` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SeqSiftError::OutputName`] if no output is given and the
    /// input is stdin or has no file name.
    pub fn new(input: &Path, output: Option<&Path>) -> Result<Self, SeqSiftError> {
        let input = Input::from_path(input);
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => default_derep_output(&input)?,
        };
        Ok(Self {
            input,
            output,
            progress_every: crate::progress::ProgressTracker::DEFAULT_INTERVAL,
        })
    }
}

fn default_derep_output(input: &Input) -> Result<PathBuf, SeqSiftError> {
    let path = input.as_path().ok_or_else(|| SeqSiftError::OutputName {
        input: input.to_string(),
    })?;
    let name = path.file_name().ok_or_else(|| SeqSiftError::OutputName {
        input: input.to_string(),
    })?;
    let mut file_name = std::ffi::OsString::from(DEREP_PREFIX);
    file_name.push(name);
    Ok(path.with_file_name(file_name))
}

impl TryFrom<&DerepArgs> for DerepConfig {
    type Error = SeqSiftError;

    fn try_from(args: &DerepArgs) -> Result<Self, Self::Error> {
        let mut config = Self::new(&args.input, args.output.as_deref())?;
        config.progress_every = args.progress_every.max(1);
        Ok(config)
    }
}

/// Settings for table-driven contig selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectConfig {
    pub contigs: Input,
    pub table: Input,
    pub delimiter: u8,
    pub thresholds: Thresholds,
    pub annotate: bool,
    pub output: Option<PathBuf>,
    pub strategy: Strategy,
}

impl SelectConfig {
    /// Config with default thresholds, indexed retrieval and stdout output.
    #[must_use]
    pub fn new(contigs: &Path, table: &Path) -> Self {
        Self {
            contigs: Input::from_path(contigs),
            table: Input::from_path(table),
            delimiter: delimiter_for(Some(table)),
            thresholds: Thresholds::default(),
            annotate: false,
            output: None,
            strategy: Strategy::default(),
        }
    }
}

impl TryFrom<&SelectArgs> for SelectConfig {
    type Error = SeqSiftError;

    fn try_from(args: &SelectArgs) -> Result<Self, Self::Error> {
        let thresholds = Thresholds {
            min_score: args.min_score,
            max_pvalue: args.max_p_value,
            min_length: (!args.no_length_filter).then_some(args.min_contig_length),
        };
        thresholds.validate()?;

        let delimiter = match args.delimiter {
            Some(c) if c.is_ascii() => c as u8,
            Some(c) => {
                return Err(SeqSiftError::InvalidDelimiter { delimiter: c });
            }
            None => delimiter_for(Some(&args.virfinder_table)),
        };

        Ok(Self {
            contigs: Input::from_path(&args.contigs_fasta),
            table: Input::from_path(&args.virfinder_table),
            delimiter,
            thresholds,
            annotate: args.annotate_fasta,
            output: args.output.clone(),
            strategy: if args.legacy_fasta_parser {
                Strategy::Scan
            } else {
                args.strategy
            },
        })
    }
}
