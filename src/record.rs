//! Sequence records and FASTA emission.

use std::io::{self, Write};

use bio::io::fasta;
use bytes::Bytes;

/// A sequence record read from FASTA or FASTQ input.
///
/// For FASTA input, quality is always `None`.
/// For FASTQ input, quality holds exactly one byte per sequence byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// First whitespace-delimited token of the header line.
    pub name: String,
    /// Residues with line breaks removed, case preserved.
    pub seq: Bytes,
    /// Quality string, present only for well-formed FASTQ records.
    pub qual: Option<Bytes>,
}

/// Record name carried by a header: the text before the first ASCII
/// whitespace, marker already removed.
///
/// Empty when the header is empty or starts with whitespace.
#[must_use]
pub fn header_name(header: &str) -> &str {
    header
        .find(|c: char| c.is_ascii_whitespace())
        .map_or(header, |end| &header[..end])
}

impl Record {
    /// Creates a FASTA record (no quality).
    pub fn fasta(name: impl Into<String>, seq: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            seq: seq.into(),
            qual: None,
        }
    }

    /// Creates a FASTQ record.
    ///
    /// Returns `None` unless `qual` is as long as `seq`.
    pub fn fastq(
        name: impl Into<String>,
        seq: impl Into<Bytes>,
        qual: impl Into<Bytes>,
    ) -> Option<Self> {
        let seq = seq.into();
        let qual = qual.into();
        (seq.len() == qual.len()).then(|| Self {
            name: name.into(),
            seq,
            qual: Some(qual),
        })
    }

    /// Returns `true` if this record carries quality scores.
    #[must_use]
    pub fn is_fastq(&self) -> bool {
        self.qual.is_some()
    }

    /// Sequence length in residues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// Returns `true` if the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Writes this record as `>name[ annotation]\nseq\n`.
    pub fn write_fasta<W: Write>(
        &self,
        writer: &mut fasta::Writer<W>,
        annotation: Option<&str>,
    ) -> io::Result<()> {
        writer.write(&self.name, annotation, &self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(record: &Record, annotation: Option<&str>) -> String {
        let mut out = Vec::new();
        {
            let mut writer = fasta::Writer::new(&mut out);
            record.write_fasta(&mut writer, annotation).unwrap();
            writer.flush().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_name_stops_at_whitespace() {
        assert_eq!(header_name("k141_7 flag=1 multi=2.0 len=150"), "k141_7");
        assert_eq!(header_name("c1\tdesc"), "c1");
        assert_eq!(header_name("plain"), "plain");
        assert_eq!(header_name(" desc"), "");
        assert_eq!(header_name(""), "");
    }

    #[test]
    fn fastq_requires_matching_quality() {
        assert!(Record::fastq("r1", "ACGT", "IIII").is_some());
        assert!(Record::fastq("r1", "ACGT", "III").is_none());
    }

    #[test]
    fn writes_plain_fasta() {
        let record = Record::fasta("contig_1", "ACGTNacgt");
        assert_eq!(render(&record, None), ">contig_1\nACGTNacgt\n");
    }

    #[test]
    fn writes_annotated_header() {
        let record = Record::fasta("contig_1", "ACGT");
        assert_eq!(
            render(&record, Some("score=0.9;pvalue=0.01;")),
            ">contig_1 score=0.9;pvalue=0.01;\nACGT\n"
        );
    }

    #[test]
    fn fastq_record_is_written_without_quality() {
        let record = Record::fastq("read", "ACG", "II#").unwrap();
        assert!(record.is_fastq());
        assert_eq!(render(&record, None), ">read\nACG\n");
    }
}
