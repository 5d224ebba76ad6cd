//! Property-based tests using proptest.
//!
//! These tests verify invariants that should hold across all valid inputs,
//! catching edge cases that might be missed by example-based tests.

use std::collections::HashSet;

use proptest::prelude::*;
use seqsift::dedup::{dedup_records, DedupMode};
use seqsift::derep::Dereplicator;
use seqsift::reader::{records_from, FastxReader};
use seqsift::table::{ScoreTable, Selection, Thresholds};
use seqsift::Record;

/// Strategy for generating DNA sequences.
fn dna_sequence(min_len: usize, max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![Just('A'), Just('C'), Just('G'), Just('T')],
        min_len..=max_len,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Records drawn from a small name and sequence pool so duplicates are common.
fn records(max: usize) -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec(
        (
            (0u8..6).prop_map(|i| format!("r{i}")),
            prop_oneof![dna_sequence(1, 4), Just("ACGT".to_string())],
        ),
        0..=max,
    )
}

fn to_fasta(records: &[(String, String)]) -> String {
    records
        .iter()
        .map(|(name, seq)| format!(">{name}\n{seq}\n"))
        .collect()
}

fn dedup(fasta: &str, mode: DedupMode) -> String {
    let mut out = Vec::new();
    dedup_records(records_from(fasta.as_bytes(), "p.fa"), mode, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn parse(fasta: &str) -> Vec<Record> {
    FastxReader::new(fasta.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap()
}

fn key(record: &Record, mode: DedupMode) -> Vec<u8> {
    match mode {
        DedupMode::Name => record.name.as_bytes().to_vec(),
        DedupMode::Sequence => record.seq.to_vec(),
    }
}

fn mode() -> impl Strategy<Value = DedupMode> {
    prop_oneof![Just(DedupMode::Name), Just(DedupMode::Sequence)]
}

/// Score table rows as (score, pvalue, length).
fn score_rows(max: usize) -> impl Strategy<Value = Vec<(f64, f64, u64)>> {
    proptest::collection::vec((0.0f64..1.0, 0.0f64..1.0, 0u64..500), 0..=max)
}

fn score_table(rows: &[(f64, f64, u64)]) -> ScoreTable {
    let mut text = String::from("name,score,pvalue,length\n");
    for (i, (score, pvalue, length)) in rows.iter().enumerate() {
        text.push_str(&format!("c{i},{score},{pvalue},{length}\n"));
    }
    ScoreTable::from_reader(text.as_bytes(), b',', "p.csv").unwrap()
}

proptest! {
    /// Deduplicating already deduplicated output changes nothing.
    #[test]
    fn dedup_is_idempotent(input in records(20), mode in mode()) {
        let once = dedup(&to_fasta(&input), mode);
        let twice = dedup(&once, mode);
        prop_assert_eq!(once, twice);
    }

    /// Output keys are exactly the distinct input keys, each once, in first-seen order.
    #[test]
    fn dedup_preserves_first_occurrence_order(input in records(20), mode in mode()) {
        let fasta = to_fasta(&input);
        let mut seen = HashSet::new();
        let expected: Vec<Vec<u8>> = parse(&fasta)
            .iter()
            .map(|r| key(r, mode))
            .filter(|k| seen.insert(k.clone()))
            .collect();

        let actual: Vec<Vec<u8>> = parse(&dedup(&fasta, mode))
            .iter()
            .map(|r| key(r, mode))
            .collect();

        prop_assert_eq!(actual, expected);
    }

    /// Cluster sizes add up to the record count and every sequence is kept once.
    #[test]
    fn derep_is_complete(input in records(20)) {
        let mut derep = Dereplicator::new();
        for record in parse(&to_fasta(&input)) {
            derep.add(record);
        }
        let clusters = derep.finish();

        let total: u64 = clusters.iter().map(|c| c.size).sum();
        prop_assert_eq!(total, input.len() as u64);

        let distinct: HashSet<&str> = input.iter().map(|(_, s)| s.as_str()).collect();
        prop_assert_eq!(clusters.len(), distinct.len());
    }

    /// Every FASTQ record the reader yields has a quality string of sequence length.
    #[test]
    fn fastq_quality_matches_sequence(seqs in proptest::collection::vec(dna_sequence(0, 30), 1..10)) {
        let fastq: String = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| format!("@q{i}\n{s}\n+\n{}\n", "I".repeat(s.len())))
            .collect();

        let records = parse(&fastq);
        prop_assert_eq!(records.len(), seqs.len());
        for record in records {
            let qual = record.qual.unwrap();
            prop_assert_eq!(qual.len(), record.seq.len());
        }
    }

    /// Arbitrary bytes never make the reader fail or break the quality invariant.
    #[test]
    fn reader_accepts_arbitrary_input(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        for record in FastxReader::new(&data[..]) {
            let record = record.unwrap();
            if let Some(qual) = record.qual {
                prop_assert_eq!(qual.len(), record.seq.len());
            }
        }
    }

    /// A row is selected iff it passes every threshold.
    #[test]
    fn selection_matches_filter(
        rows in score_rows(30),
        min_score in 0.0f64..1.0,
        max_pvalue in 0.0f64..1.0,
        min_length in 0u64..500,
    ) {
        let thresholds = Thresholds { min_score, max_pvalue, min_length: Some(min_length) };
        let table = score_table(&rows);
        let selection = Selection::new(table.clone(), &thresholds);

        for row in table.rows() {
            let expected = row.score >= min_score
                && row.pvalue <= max_pvalue
                && row.length.is_some_and(|l| l >= min_length);
            prop_assert_eq!(selection.contains(&row.name), expected);
        }
    }

    /// Selected rows come out in non-increasing score order.
    #[test]
    fn selection_sorted_by_score(rows in score_rows(30)) {
        let selection = Selection::new(score_table(&rows), &Thresholds {
            min_score: 0.0,
            max_pvalue: 1.0,
            min_length: None,
        });
        prop_assert_eq!(selection.len(), rows.len());
        for pair in selection.rows().windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
