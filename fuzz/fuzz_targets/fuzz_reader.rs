//! Fuzz target for `FastxReader`.
//!
//! Arbitrary bytes must never panic the reader, and every FASTQ record it
//! yields must carry a quality string as long as its sequence.

#![no_main]

use libfuzzer_sys::fuzz_target;
use seqsift::dedup::{Deduplicator, DedupMode};
use seqsift::reader::FastxReader;

fuzz_target!(|data: &[u8]| {
    let mut by_seq = Deduplicator::new(DedupMode::Sequence);

    for record in FastxReader::new(data) {
        // Reading from a slice cannot fail at the I/O level.
        let record = record.expect("in-memory read failed");

        if let Some(qual) = &record.qual {
            assert_eq!(
                qual.len(),
                record.seq.len(),
                "quality length mismatch for {}",
                record.name
            );
        }
        assert!(
            !record.name.bytes().any(|b| b.is_ascii_whitespace()),
            "name contains whitespace: {:?}",
            record.name
        );
        by_seq.observe(&record);
    }

    let stats = by_seq.stats();
    assert!(stats.emitted <= stats.total);
    assert_eq!(stats.emitted as usize, by_seq.distinct());
});
