//! Score tables and threshold filtering.
//!
//! A score table is a delimited text file with a header row naming at least
//! `name`, `score` and `pvalue` columns, and optionally `length`, one row per
//! contig (the layout written by VirFinder). Rows passing every threshold form
//! a [`Selection`], ordered by descending score.
//!
//! # Example
//!
//! ```rust
//! use seqsift::table::{ScoreTable, Selection, Thresholds};
//!
//! let csv = "name,length,score,pvalue\nX,150,0.9,0.01\nY,150,0.5,0.01\nZ,150,0.9,0.2\n";
//! let table = ScoreTable::from_reader(csv.as_bytes(), b',', "scores.csv")?;
//! let selection = Selection::new(table, &Thresholds::default());
//!
//! assert_eq!(selection.names().collect::<Vec<_>>(), ["X"]);
//! # Ok::<(), seqsift::error::SeqSiftError>(())
//! ```

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, Trim};
use rustc_hash::FxHashMap;
use serde::{de::Error as _, Deserialize, Deserializer};

use crate::{error::SeqSiftError, input::Input, record::header_name};

/// Column names the table must provide.
const REQUIRED_COLUMNS: [&str; 3] = ["name", "score", "pvalue"];

/// Optional column enabling the length threshold.
const LENGTH_COLUMN: &str = "length";

/// One scored contig.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoreRow {
    pub name: String,
    #[serde(deserialize_with = "deserialize_metric")]
    pub score: f64,
    #[serde(deserialize_with = "deserialize_metric")]
    pub pvalue: f64,
    #[serde(default, deserialize_with = "deserialize_length")]
    pub length: Option<u64>,
}

impl ScoreRow {
    /// Name of the FASTA record this row scores.
    ///
    /// VirFinder copies whole headers into `name`, so only the text before the
    /// first whitespace is used, the same rule the reader applies to headers.
    #[must_use]
    pub fn contig_name(&self) -> &str {
        header_name(&self.name)
    }

    /// Header annotation carrying this row's metrics.
    #[must_use]
    pub fn annotation(&self) -> String {
        format!("score={};pvalue={};", self.score, self.pvalue)
    }
}

/// Missing-value markers written by R and pandas.
fn is_missing(field: &str) -> bool {
    matches!(field, "" | "NA" | "NaN" | "nan" | "NULL")
}

/// Parses a score or p-value, mapping missing markers to NaN.
fn deserialize_metric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let field = String::deserialize(deserializer)?;
    let field = field.trim();
    if is_missing(field) {
        return Ok(f64::NAN);
    }
    field
        .parse()
        .map_err(|_| D::Error::custom(format!("'{field}' is not a number")))
}

fn deserialize_length<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let field = String::deserialize(deserializer)?;
    let field = field.trim();
    if is_missing(field) {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| D::Error::custom(format!("'{field}' is not a contig length")))
}

/// Picks the field delimiter from a table path's extension.
///
/// `.tsv` and `.tab` are tab-separated; everything else, stdin included, is
/// comma-separated.
#[must_use]
pub fn delimiter_for(path: Option<&Path>) -> u8 {
    let ext = path
        .and_then(Path::extension)
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("tsv" | "tab") => b'\t',
        _ => b',',
    }
}

/// All rows of a score table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    rows: Vec<ScoreRow>,
    has_length: bool,
}

impl ScoreTable {
    /// Loads a table from a file or stdin.
    ///
    /// # Errors
    ///
    /// Returns [`SeqSiftError::TableRead`] if the input cannot be opened,
    /// [`SeqSiftError::MissingColumn`] if a required column is absent, and
    /// [`SeqSiftError::Table`] for unparseable rows.
    pub fn load(input: &Input, delimiter: u8) -> Result<Self, SeqSiftError> {
        let path = input.display_path();
        let reader = input.open().map_err(|source| SeqSiftError::TableRead {
            source,
            path: path.clone(),
        })?;
        Self::from_reader(reader, delimiter, path)
    }

    /// Parses a table from any reader; `path` is used in error messages.
    ///
    /// # Errors
    ///
    /// See [`ScoreTable::load`].
    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        path: impl Into<PathBuf>,
    ) -> Result<Self, SeqSiftError> {
        let path = path.into();
        let table_error = |source| SeqSiftError::Table {
            source,
            path: path.clone(),
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(table_error)?.clone();
        if let Some(column) = REQUIRED_COLUMNS
            .into_iter()
            .find(|column| !headers.iter().any(|h| h == *column))
        {
            return Err(SeqSiftError::MissingColumn {
                column,
                path: path.clone(),
            });
        }
        let has_length = headers.iter().any(|h| h == LENGTH_COLUMN);

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<ScoreRow>, _>>()
            .map_err(table_error)?;

        tracing::debug!(rows = rows.len(), has_length, path = ?path, "Loaded score table");
        Ok(Self { rows, has_length })
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the table has a `length` column.
    #[must_use]
    pub fn has_length(&self) -> bool {
        self.has_length
    }

    /// Rows in table order.
    #[must_use]
    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }
}

/// Threshold predicates applied to every row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Rows need `score >= min_score`.
    pub min_score: f64,
    /// Rows need `pvalue <= max_pvalue`.
    pub max_pvalue: f64,
    /// Rows need `length >= min_length`, when set and the table has lengths.
    pub min_length: Option<u64>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_score: 0.7,
            max_pvalue: 0.05,
            min_length: Some(100),
        }
    }
}

impl Thresholds {
    /// Checks that the thresholds are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SeqSiftError::InvalidThreshold`] for a non-finite score or a
    /// p-value outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), SeqSiftError> {
        if !self.min_score.is_finite() {
            return Err(SeqSiftError::InvalidThreshold {
                name: "minimum score",
                value: self.min_score,
                reason: "must be a finite number",
            });
        }
        if !(0.0..=1.0).contains(&self.max_pvalue) {
            return Err(SeqSiftError::InvalidThreshold {
                name: "maximum p-value",
                value: self.max_pvalue,
                reason: "must be between 0 and 1",
            });
        }
        Ok(())
    }

    /// Whether `row` passes. The length test runs only if `check_length`.
    ///
    /// NaN metrics never pass.
    #[must_use]
    pub fn passes(&self, row: &ScoreRow, check_length: bool) -> bool {
        let length_ok = match (check_length, self.min_length) {
            (true, Some(min)) => row.length.is_some_and(|len| len >= min),
            _ => true,
        };
        row.score >= self.min_score && row.pvalue <= self.max_pvalue && length_ok
    }
}

/// Rows passing the thresholds, sorted by descending score.
///
/// Rows are keyed by [`ScoreRow::contig_name`]. The sort is stable: rows with
/// equal scores keep their table order. A contig name occurring more than once
/// keeps only its highest-ranked row.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    rows: Vec<ScoreRow>,
    positions: FxHashMap<String, usize>,
    total_rows: usize,
}

impl Selection {
    /// Filters and sorts `table`.
    #[must_use]
    pub fn new(table: ScoreTable, thresholds: &Thresholds) -> Self {
        let total_rows = table.len();
        let check_length = table.has_length();
        if thresholds.min_length.is_some() && !check_length {
            tracing::warn!("score table has no 'length' column; minimum length not applied");
        }

        let mut passing: Vec<ScoreRow> = table
            .rows
            .into_iter()
            .filter(|row| thresholds.passes(row, check_length))
            .collect();
        passing.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut positions = FxHashMap::default();
        let mut rows = Vec::with_capacity(passing.len());
        for row in passing {
            let name = row.contig_name();
            if positions.contains_key(name) {
                tracing::warn!(name = %row.name, "duplicate contig name in score table");
                continue;
            }
            positions.insert(name.to_owned(), rows.len());
            rows.push(row);
        }

        tracing::info!(
            total = total_rows,
            selected = rows.len(),
            "Applied score table thresholds"
        );
        Self {
            rows,
            positions,
            total_rows,
        }
    }

    /// Selected contig names, highest score first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(ScoreRow::contig_name)
    }

    /// Selected rows, highest score first.
    #[must_use]
    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    /// Row for a selected contig name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScoreRow> {
        self.positions.get(name).map(|&i| &self.rows[i])
    }

    /// Whether `name` is selected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Number of selected names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in the table before filtering.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: &str = "\
name,length,score,pvalue
X,150,0.9,0.01
Y,150,0.5,0.01
Z,150,0.9,0.2
";

    fn table(text: &str) -> ScoreTable {
        ScoreTable::from_reader(text.as_bytes(), b',', "scores.csv").unwrap()
    }

    #[test]
    fn default_thresholds_select_only_passing_rows() {
        let selection = Selection::new(table(SCORES), &Thresholds::default());
        assert_eq!(selection.names().collect::<Vec<_>>(), ["X"]);
        assert_eq!(selection.total_rows(), 3);
        assert!(selection.contains("X"));
        assert!(!selection.contains("Z"));
    }

    #[test]
    fn thresholds_are_inclusive() {
        let text = "name,score,pvalue,length\nedge,0.7,0.05,100\n";
        let selection = Selection::new(table(text), &Thresholds::default());
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn sorted_by_descending_score_with_stable_ties() {
        let text = "\
name,score,pvalue,length
low,0.75,0.01,500
tie_a,0.95,0.01,500
high,0.99,0.01,500
tie_b,0.95,0.01,500
";
        let selection = Selection::new(table(text), &Thresholds::default());
        assert_eq!(
            selection.names().collect::<Vec<_>>(),
            ["high", "tie_a", "tie_b", "low"]
        );
    }

    #[test]
    fn short_contigs_are_dropped() {
        let text = "name,score,pvalue,length\nshort,0.9,0.01,99\nlong,0.9,0.01,100\n";
        let selection = Selection::new(table(text), &Thresholds::default());
        assert_eq!(selection.names().collect::<Vec<_>>(), ["long"]);
    }

    #[test]
    fn length_filter_skipped_without_column() {
        let text = "name,score,pvalue\na,0.9,0.01\n";
        let table = table(text);
        assert!(!table.has_length());
        let selection = Selection::new(table, &Thresholds::default());
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn missing_length_cell_fails_length_filter() {
        let text = "name,score,pvalue,length\na,0.9,0.01,\nb,0.9,0.01,NA\n";
        let table = table(text);
        assert_eq!(table.rows()[0].length, None);
        let selection = Selection::new(table.clone(), &Thresholds::default());
        assert!(selection.is_empty());

        let no_length = Thresholds {
            min_length: None,
            ..Thresholds::default()
        };
        assert_eq!(Selection::new(table, &no_length).len(), 2);
    }

    #[test]
    fn na_scores_never_pass() {
        let text = "name,score,pvalue\na,NA,0.01\nb,0.9,NaN\n";
        let table = table(text);
        assert!(table.rows()[0].score.is_nan());
        let selection = Selection::new(table, &Thresholds::default());
        assert!(selection.is_empty());
    }

    #[test]
    fn quoted_r_style_table_with_row_names() {
        let text = "\"\",\"name\",\"length\",\"score\",\"pvalue\"\n\"1\",\"k141_7 flag=1\",\"2000\",\"0.98\",\"0.001\"\n";
        let selection = Selection::new(table(text), &Thresholds::default());
        assert_eq!(selection.names().collect::<Vec<_>>(), ["k141_7"]);
        assert_eq!(selection.rows()[0].name, "k141_7 flag=1");
        assert!(selection.contains("k141_7"));
        assert!(!selection.contains("k141_7 flag=1"));
    }

    #[test]
    fn names_differing_only_in_description_collapse() {
        let text = "name,score,pvalue\nc1 len=10,0.8,0.01\nc1 len=99,0.9,0.01\n";
        let selection = Selection::new(table(text), &Thresholds::default());
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.get("c1").unwrap().score, 0.9);
    }

    #[test]
    fn missing_required_column() {
        let err = ScoreTable::from_reader("name,score\na,0.9\n".as_bytes(), b',', "t.csv")
            .unwrap_err();
        assert!(matches!(
            err,
            SeqSiftError::MissingColumn {
                column: "pvalue",
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unparseable_score_is_fatal() {
        let err = ScoreTable::from_reader(
            "name,score,pvalue\na,high,0.01\n".as_bytes(),
            b',',
            "t.csv",
        )
        .unwrap_err();
        assert!(matches!(err, SeqSiftError::Table { .. }));
    }

    #[test]
    fn tab_separated_table() {
        let text = "name\tscore\tpvalue\na\t0.8\t0.01\n";
        let table = ScoreTable::from_reader(text.as_bytes(), b'\t', "t.tsv").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn delimiter_from_extension() {
        assert_eq!(delimiter_for(Some(Path::new("scores.tsv"))), b'\t');
        assert_eq!(delimiter_for(Some(Path::new("scores.TAB"))), b'\t');
        assert_eq!(delimiter_for(Some(Path::new("scores.csv"))), b',');
        assert_eq!(delimiter_for(None), b',');
    }

    #[test]
    fn duplicate_names_keep_highest_score() {
        let text = "name,score,pvalue\na,0.8,0.01\na,0.9,0.01\n";
        let selection = Selection::new(table(text), &Thresholds::default());
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.get("a").map(|r| r.score), Some(0.9));
    }

    #[test]
    fn annotation_format() {
        let row = ScoreRow {
            name: "X".to_string(),
            score: 0.9,
            pvalue: 0.01,
            length: Some(150),
        };
        assert_eq!(row.annotation(), "score=0.9;pvalue=0.01;");
    }

    #[test]
    fn threshold_validation() {
        assert!(Thresholds::default().validate().is_ok());
        let bad_p = Thresholds {
            max_pvalue: 1.5,
            ..Thresholds::default()
        };
        let bad_score = Thresholds {
            min_score: f64::NAN,
            ..Thresholds::default()
        };
        assert!(bad_p.validate().is_err());
        assert!(bad_score.validate().is_err());
    }
}
