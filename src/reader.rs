//! Streaming FASTA/FASTQ record reader.
//!
//! [`FastxReader`] pulls one record at a time from any [`BufRead`]. The mode
//! of each record is decided by the line that ends its sequence body, so FASTA
//! and FASTQ records may be mixed in one stream.
//!
//! Malformed input never produces an error. A FASTQ record whose quality block
//! is cut short by end of input is returned as a FASTA record and ends the
//! stream. Only I/O failures of the underlying reader surface as `Err` items.
//!
//! A record's name is the header text up to the first whitespace. A bare `>`
//! or a header starting with whitespace (`> desc`) gives an empty name, which
//! is kept as is: deduplicating by name treats all such records as one.
//!
//! # Example
//!
//! ```rust
//! use seqsift::reader::FastxReader;
//!
//! let data = b">a desc\nAC\nGT\n@b\nTTTT\n+\nIIII\n";
//! let records: Vec<_> = FastxReader::new(&data[..])
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].name, "a");
//! assert_eq!(&records[0].seq[..], b"ACGT");
//! assert!(records[0].qual.is_none());
//! assert_eq!(records[1].qual.as_deref(), Some(&b"IIII"[..]));
//! ```

use std::{
    io::{self, BufRead},
    path::PathBuf,
};

use bytes::{Bytes, BytesMut};

use crate::{
    error::SeqSiftError,
    input::Input,
    record::{header_name, Record},
};

/// Pull-based reader over FASTA and FASTQ records.
pub struct FastxReader<R> {
    inner: R,
    pending: Option<Vec<u8>>,
    line: Vec<u8>,
    done: bool,
}

impl<R: BufRead> FastxReader<R> {
    /// Wraps a buffered reader positioned at the start of input.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: None,
            line: Vec::new(),
            done: false,
        }
    }

    /// Reads the next record, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying reader. The reader is
    /// exhausted afterwards.
    pub fn next_record(&mut self) -> io::Result<Option<Record>> {
        if self.done {
            return Ok(None);
        }
        match self.advance() {
            Ok(record) => Ok(record),
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }

    fn advance(&mut self) -> io::Result<Option<Record>> {
        let header = match self.pending.take() {
            Some(header) => header,
            None => match self.seek_header()? {
                Some(header) => header,
                None => {
                    self.done = true;
                    return Ok(None);
                }
            },
        };
        let name = parse_name(&header[1..]);
        if name.is_empty() {
            tracing::debug!(header = %String::from_utf8_lossy(&header), "record has an empty name");
        }

        let mut seq = BytesMut::new();
        let terminator = loop {
            if !self.read_line()? {
                break None;
            }
            if is_terminator(&self.line) {
                break Some(self.line.clone());
            }
            seq.extend_from_slice(&self.line);
        };
        let seq = seq.freeze();

        match terminator {
            None => {
                self.done = true;
                Ok(Some(Record::fasta(name, seq)))
            }
            Some(line) if line[0] != b'+' => {
                self.pending = Some(line);
                Ok(Some(Record::fasta(name, seq)))
            }
            Some(_) => self.read_quality(name, seq).map(Some),
        }
    }

    /// Accumulates quality lines until they cover the sequence.
    fn read_quality(&mut self, name: String, seq: Bytes) -> io::Result<Record> {
        let mut qual = BytesMut::with_capacity(seq.len());
        loop {
            if !self.read_line()? {
                // Truncated quality block: fall back to FASTA and stop.
                self.done = true;
                return Ok(Record::fasta(name, seq));
            }
            qual.extend_from_slice(&self.line);
            if qual.len() >= seq.len() {
                break;
            }
        }
        let qual = qual.freeze();
        if qual.len() == seq.len() {
            Ok(Record {
                name,
                seq,
                qual: Some(qual),
            })
        } else {
            tracing::debug!(
                name = %name,
                seq_len = seq.len(),
                qual_len = qual.len(),
                "quality longer than sequence, keeping record as FASTA"
            );
            Ok(Record::fasta(name, seq))
        }
    }

    /// Skips lines until one starts with `>` or `@`.
    fn seek_header(&mut self) -> io::Result<Option<Vec<u8>>> {
        while self.read_line()? {
            if matches!(self.line.first(), Some(b'>' | b'@')) {
                return Ok(Some(self.line.clone()));
            }
        }
        Ok(None)
    }

    /// Reads one line into `self.line` without its terminator.
    ///
    /// Returns `false` at end of input.
    fn read_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        if self.inner.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        if self.line.last() == Some(&b'\n') {
            self.line.pop();
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for FastxReader<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Reads records from `reader`, attaching `path` to I/O errors.
pub fn records_from<R: BufRead>(
    reader: R,
    path: impl Into<PathBuf>,
) -> impl Iterator<Item = Result<Record, SeqSiftError>> {
    let path = path.into();
    FastxReader::new(reader).map(move |record| {
        record.map_err(|source| SeqSiftError::SequenceRead {
            source,
            path: path.clone(),
        })
    })
}

/// Opens `input` and streams its records.
///
/// # Errors
///
/// Returns [`SeqSiftError::SequenceRead`] if the input cannot be opened.
pub fn read_input(
    input: &Input,
) -> Result<impl Iterator<Item = Result<Record, SeqSiftError>>, SeqSiftError> {
    let path = input.display_path();
    let reader = input.open().map_err(|source| SeqSiftError::SequenceRead {
        source,
        path: path.clone(),
    })?;
    Ok(records_from(reader, path))
}

fn is_terminator(line: &[u8]) -> bool {
    matches!(line.first(), Some(b'@' | b'+' | b'>'))
}

fn parse_name(header: &[u8]) -> String {
    header_name(&String::from_utf8_lossy(header)).to_owned()
}

/// Counts FASTA header lines (`>`) in a stream.
///
/// Used to estimate the total number of records before a full pass.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader.
pub fn count_headers<R: BufRead>(mut reader: R) -> io::Result<u64> {
    let mut count = 0;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(count);
        }
        if line.first() == Some(&b'>') {
            count += 1;
        }
    }
}
