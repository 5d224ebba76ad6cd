//! Command-line interface definition.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::select::Strategy;

/// Dereplicate FASTA/FASTQ files and select contigs from score tables.
#[derive(Parser, Debug)]
#[command(name = "seqsift")]
#[command(version, author, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Print extra information
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print debug information
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress informational output and warnings
    #[arg(short, long, global = true, conflicts_with_all = ["verbose", "debug"])]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the first record for each name (or sequence) to stdout
    Dedup(DedupArgs),
    /// Collapse identical sequences into `name;size=N;` records
    Derep(DerepArgs),
    /// Print the FASTA records passing filters from a VirFinder table
    Select(SelectArgs),
}

#[derive(ClapArgs, Debug)]
pub struct DedupArgs {
    /// Input file in FASTA or FASTQ format ("-" for stdin)
    #[arg(short = 'f', long = "fasta", visible_short_alias = 'i')]
    pub fasta: PathBuf,

    /// Remove duplicates by sequence (default: by name)
    #[arg(short = 's', long)]
    pub by_seq: bool,
}

#[derive(ClapArgs, Debug)]
pub struct DerepArgs {
    /// The FASTA file to dereplicate
    #[arg(short, long = "input")]
    pub input: PathBuf,

    /// Output file (default: derep_<input file name> next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Records between progress updates
    #[arg(long, default_value = "10000")]
    pub progress_every: u64,
}

#[derive(ClapArgs, Debug)]
pub struct SelectArgs {
    /// Contigs/scaffold file in FASTA format ("-" for stdin)
    #[arg(short = 'f', long)]
    pub contigs_fasta: PathBuf,

    /// VirFinder output table (CSV, or TSV by extension)
    #[arg(short = 't', long, visible_alias = "table")]
    pub virfinder_table: PathBuf,

    /// Maximum p-value
    #[arg(short = 'p', long, default_value = "0.05")]
    pub max_p_value: f64,

    /// Minimum score
    #[arg(short = 's', long, default_value = "0.7")]
    pub min_score: f64,

    /// Minimum contig length (needs a `length` column)
    #[arg(short = 'l', long, default_value = "100")]
    pub min_contig_length: u64,

    /// Do not filter on contig length
    #[arg(long, conflicts_with = "min_contig_length")]
    pub no_length_filter: bool,

    /// Add score and p-value as a comment in the FASTA headers
    #[arg(short, long)]
    pub annotate_fasta: bool,

    /// Output FASTA file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How records are retrieved from the FASTA file
    #[arg(long, value_enum, default_value = "indexed")]
    pub strategy: Strategy,

    /// Stream the FASTA and keep its order (same as --strategy scan)
    #[arg(short = 'u', long)]
    pub legacy_fasta_parser: bool,

    /// Table field delimiter (default: tab for .tsv/.tab, comma otherwise)
    #[arg(long)]
    pub delimiter: Option<char>,
}
