//! Reads delimited text files as a sequence of records, and indexes them so that readers can
//! start in the middle of a file.
//!
//! Every non-empty line is one record; there is no header row. Blank lines are ignored by the
//! underlying CSV reader and do not count as records.

use std::fs;
use std::io;
use std::path::Path;

/// Returns the CSV reader configuration used for all record sources.
fn reader_builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(false).flexible(true).delimiter(delimiter);
    b
}

/// A record source, keeping track of the index of the next record.
pub struct RecordReader<Src: io::Read> {
    rdr: csv::Reader<Src>,
    record: csv::StringRecord,
    skip_buf: csv::ByteRecord,
    next_index: usize,
}

impl RecordReader<fs::File> {
    /// Opens a file for reading records.
    pub fn new_from_file(path: &Path, delimiter: u8) -> csv::Result<RecordReader<fs::File>> {
        reader_builder(delimiter).from_path(path).map(RecordReader::wrap)
    }
}

impl<Src: io::Read> RecordReader<Src> {
    pub fn new_from_reader(src: Src, delimiter: u8) -> RecordReader<Src> {
        RecordReader::wrap(reader_builder(delimiter).from_reader(src))
    }

    fn wrap(rdr: csv::Reader<Src>) -> RecordReader<Src> {
        RecordReader {
            rdr,
            record: csv::StringRecord::new(),
            skip_buf: csv::ByteRecord::new(),
            next_index: 0,
        }
    }

    /// Index of the record that the next read returns.
    pub fn index(&self) -> usize {
        self.next_index
    }

    /// Position of the record that the next read returns.
    pub fn position(&self) -> &csv::Position {
        self.rdr.position()
    }

    /// Reads the next record. Returns None at the end of the source.
    pub fn read_next(&mut self) -> csv::Result<Option<&csv::StringRecord>> {
        if self.rdr.read_record(&mut self.record)? {
            self.next_index += 1;
            Ok(Some(&self.record))
        } else {
            Ok(None)
        }
    }

    /// Reads and discards up to `n` records without decoding them; returns how many were
    /// actually skipped (less than `n` only at the end of the source).
    pub fn skip(&mut self, n: usize) -> csv::Result<usize> {
        let mut skipped = 0;
        while skipped < n {
            if !self.rdr.read_byte_record(&mut self.skip_buf)? {
                break;
            }
            skipped += 1;
        }
        self.next_index += skipped;
        Ok(skipped)
    }
}

impl<Src: io::Read + io::Seek> RecordReader<Src> {
    /// Repositions the reader so that the next record read is the checkpointed one.
    pub fn seek(&mut self, cp: &Checkpoint) -> csv::Result<()> {
        self.rdr.seek(cp.position.clone())?;
        self.next_index = cp.index;
        Ok(())
    }
}

/// The first field of a record, if it is present and non-empty.
pub fn first_field(record: &csv::StringRecord) -> Option<&str> {
    record.get(0).filter(|f| !f.is_empty())
}

/// The saved position of one record.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    pub index: usize,
    pub position: csv::Position,
}

/// Result of one full pass over a record source: the number of records, and the position of
/// every `interval`-th record.
#[derive(Clone, Debug)]
pub struct RecordIndex {
    total: usize,
    interval: usize,
    checkpoints: Vec<Checkpoint>,
}

impl RecordIndex {
    /// Scans the file at `path` once.
    pub fn build(path: &Path, delimiter: u8, interval: usize) -> csv::Result<RecordIndex> {
        let rdr = RecordReader::new_from_file(path, delimiter)?;
        RecordIndex::build_from(rdr, interval)
    }

    pub fn build_from<Src: io::Read>(mut rdr: RecordReader<Src>,
                                     interval: usize)
                                     -> csv::Result<RecordIndex> {
        let interval = interval.max(1);
        let mut checkpoints = Vec::new();

        loop {
            let index = rdr.index();
            let position = if index % interval == 0 {
                Some(rdr.position().clone())
            } else {
                None
            };

            if rdr.skip(1)? == 0 {
                break;
            }
            if let Some(position) = position {
                checkpoints.push(Checkpoint { index, position });
            }
        }

        Ok(RecordIndex {
            total: rdr.index(),
            interval,
            checkpoints,
        })
    }

    /// Number of records in the source.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The closest checkpoint at or before record `index`.
    pub fn checkpoint_for(&self, index: usize) -> Option<&Checkpoint> {
        if index >= self.total {
            return None;
        }
        self.checkpoints.get(index / self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DATA: &str = "P1,LHR,JFK\nP2,CDG,ORD\n\nP1,ORD,LAX\nP3,LAX,SFO\nP2,SFO,HND\n";

    fn reader() -> RecordReader<Cursor<&'static [u8]>> {
        RecordReader::new_from_reader(Cursor::new(DATA.as_bytes()), b',')
    }

    fn passengers<Src: io::Read>(r: &mut RecordReader<Src>) -> Vec<String> {
        let mut v = Vec::new();
        while let Some(rec) = r.read_next().unwrap() {
            v.push(first_field(rec).unwrap().to_string());
        }
        v
    }

    #[test]
    fn test_read_records() {
        let mut r = reader();
        assert_eq!(passengers(&mut r), vec!["P1", "P2", "P1", "P3", "P2"]);
        assert_eq!(r.index(), 5);
    }

    #[test]
    fn test_skip() {
        let mut r = reader();
        assert_eq!(r.skip(3).unwrap(), 3);
        assert_eq!(r.index(), 3);
        assert_eq!(passengers(&mut r), vec!["P3", "P2"]);
        assert_eq!(r.skip(4).unwrap(), 0);
    }

    #[test]
    fn test_index_and_seek() {
        let idx = RecordIndex::build_from(reader(), 2).unwrap();
        assert_eq!(idx.total(), 5);
        assert!(idx.checkpoint_for(5).is_none());

        for start in 0..5 {
            let cp = idx.checkpoint_for(start).unwrap().clone();
            assert!(cp.index <= start);
            assert!(start - cp.index < 2);

            let mut r = reader();
            r.seek(&cp).unwrap();
            r.skip(start - cp.index).unwrap();
            let rest = passengers(&mut r);
            assert_eq!(rest.len(), 5 - start);
        }
    }

    #[test]
    fn test_seek_lands_on_record() {
        let idx = RecordIndex::build_from(reader(), 1).unwrap();
        let mut r = reader();
        r.seek(idx.checkpoint_for(3).unwrap()).unwrap();
        assert_eq!(r.index(), 3);
        assert_eq!(passengers(&mut r), vec!["P3", "P2"]);
    }

    #[test]
    fn test_first_field() {
        let mut r = RecordReader::new_from_reader(Cursor::new(&b",x\nP9\n"[..]), b',');
        assert_eq!(first_field(r.read_next().unwrap().unwrap()), None);
        assert_eq!(first_field(r.read_next().unwrap().unwrap()), Some("P9"));
    }

    #[test]
    fn test_empty_source() {
        let idx = RecordIndex::build_from(
            RecordReader::new_from_reader(Cursor::new(&b""[..]), b','), 4).unwrap();
        assert_eq!(idx.total(), 0);
        assert!(idx.checkpoint_for(0).is_none());
    }
}
