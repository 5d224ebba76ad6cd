//! Fuzz target for score table parsing and selection.
//!
//! Parsing may reject input but must not panic, and any selection built
//! from a parsed table must be sorted by descending score.

#![no_main]

use libfuzzer_sys::fuzz_target;
use seqsift::table::{ScoreTable, Selection, Thresholds};

fuzz_target!(|data: &[u8]| {
    let Ok(table) = ScoreTable::from_reader(data, b',', "fuzz.csv") else {
        return;
    };

    let selection = Selection::new(table, &Thresholds::default());
    for pair in selection.rows().windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(selection.len() <= selection.total_rows());
});
