use std::{
    io::{self, Write},
    process,
    time::Instant,
};

use clap::Parser;
use colored::Colorize;
use seqsift::{
    cli::{Args, Command, DedupArgs, DerepArgs, SelectArgs},
    config::{DedupConfig, DerepConfig, SelectConfig},
    error::SeqSiftError,
    logging,
    progress::{format_hms, Progress},
    run,
};

fn main() {
    let args = Args::parse();
    logging::init(args.verbose, args.debug, args.quiet);

    let result = match &args.command {
        Command::Dedup(cmd) => dedup(cmd, args.quiet),
        Command::Derep(cmd) => derep(cmd, args.quiet),
        Command::Select(cmd) => select(cmd, args.quiet),
    };

    if let Err(e) = result {
        eprintln!("{}\n {}", "FATAL ERROR:".red().bold(), e.to_string().red());
        process::exit(e.exit_code());
    }
}

fn dedup(args: &DedupArgs, quiet: bool) -> Result<(), SeqSiftError> {
    let config = DedupConfig::from(args);
    let stats = run::run_dedup(&config, io::stdout().lock())?;
    if !quiet {
        eprintln!(
            "{}/{} sequences printed",
            stats.emitted.to_string().bold(),
            stats.total
        );
    }
    Ok(())
}

fn derep(args: &DerepArgs, quiet: bool) -> Result<(), SeqSiftError> {
    let start = Instant::now();
    let config = DerepConfig::try_from(args)?;

    let total = run::expected_records(&config.input);
    if !quiet {
        if let Some(total) = total {
            println!(
                "{} {} {}",
                "There are".bold(),
                total.to_string().blue().bold(),
                "sequences in the fasta".bold()
            );
        }
        println!("{}", "Checking for duplicates".bold());
    }

    let pass = run::derep_clusters(&config, total, |progress| {
        if !quiet {
            print_progress(progress);
        }
    })?;

    if !quiet {
        println!();
        println!(
            "{} {} {}",
            "It took".bold(),
            format_hms(pass.elapsed).blue().bold(),
            "to remove duplicates".bold()
        );
        println!(
            "{} {}",
            "Writing the output file:".bold(),
            config.output.display().to_string().underline().blue()
        );
    }
    run::write_derep_output(&config.output, &pass.clusters)?;

    if !quiet {
        println!(
            "{}\t{}",
            "Total time:".bold(),
            format_hms(start.elapsed()).blue().bold()
        );
    }
    Ok(())
}

fn print_progress(progress: Progress) {
    let mut stdout = io::stdout().lock();
    let _ = match progress.percent_complete() {
        Some(percent) => write!(stdout, "Percent complete:\t{percent:.0}%\r"),
        None => write!(stdout, "Records processed:\t{}\r", progress.records_processed),
    };
    let _ = stdout.flush();
}

fn select(args: &SelectArgs, quiet: bool) -> Result<(), SeqSiftError> {
    let config = SelectConfig::try_from(args)?;
    let stats = run::run_select(&config)?;
    if !quiet && config.output.is_some() {
        eprintln!(
            "{}/{} selected contigs written",
            stats.written.to_string().bold(),
            stats.selected
        );
    }
    Ok(())
}
