use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};

/// One tab-separated line of the primary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Where the line starts in the primary file.
    pub offset: u64,
    pub fields: Vec<String>,
}

/// Raw bytes of column `column` in a tab-separated line, without the line
/// terminator. `None` if the line has fewer columns.
pub fn key_at(line: &[u8], column: usize) -> Option<&[u8]> {
    let line = trim_newline(line);
    line.split(|&b| b == b'\t').nth(column)
}

fn trim_newline(mut line: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    line
}

impl Record {
    /// Split a raw line into fields. Non-UTF-8 bytes are replaced, since
    /// rendering is the only consumer of non-key fields.
    pub fn parse(line: &[u8], offset: u64) -> Self {
        let fields = trim_newline(line)
            .split(|&b| b == b'\t')
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect();
        Record { offset, fields }
    }

    /// Read the line starting at `offset`. `None` if `offset` is at or past EOF.
    pub fn read_at<R: BufRead + Seek>(reader: &mut R, offset: u64) -> Result<Option<Self>> {
        reader.seek(SeekFrom::Start(offset))?;
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(Record::parse(&line, offset)))
    }

    /// Open `path` and read the line starting at `offset`.
    pub fn open_at(path: &Path, offset: u64) -> Result<Option<Self>> {
        let file = File::open(path).map_err(|e| Error::open(path, e))?;
        Record::read_at(&mut BufReader::new(file), offset)
    }

    /// Column names from the first line of the primary file.
    pub fn read_header(path: &Path) -> Result<Vec<String>> {
        Ok(Record::open_at(path, 0)?
            .map(|r| r.fields)
            .unwrap_or_default())
    }

    pub fn field(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Human-readable dump, one `name: 'value'` line per field.
    ///
    /// Fields beyond the header are labelled `field N`.
    pub fn render(&self, header: &[String]) -> String {
        let rule = "-".repeat(22);
        let mut out = format!("{rule}\nRecord at offset {}\n{rule}", self.offset);
        for (i, value) in self.fields.iter().enumerate() {
            let name = header
                .get(i)
                .filter(|h| !h.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("field {i}"));
            let _ = write!(out, "\n{name}: '{value}'");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn key_at_picks_column() {
        assert_eq!(key_at(b"a\tb\tc\n", 1), Some(&b"b"[..]));
        assert_eq!(key_at(b"a\tb\tc\r\n", 2), Some(&b"c"[..]));
        assert_eq!(key_at(b"a\tb\n", 5), None);
    }

    #[test]
    fn read_at_offset() {
        let data = b"h1\th2\nx\t1\ny\t2\n";
        let mut cursor = Cursor::new(&data[..]);
        let rec = Record::read_at(&mut cursor, 10).unwrap().unwrap();
        assert_eq!(rec.fields, vec!["y", "2"]);
        assert_eq!(rec.offset, 10);
        assert!(Record::read_at(&mut cursor, data.len() as u64).unwrap().is_none());
    }

    #[test]
    fn render_uses_header_names() {
        let rec = Record::parse(b"SP\t0001\tmaria\textra\n", 42);
        let header = vec!["UF".to_string(), "NIS".to_string(), "Nome".to_string()];
        let text = rec.render(&header);
        assert!(text.contains("Record at offset 42"));
        assert!(text.contains("UF: 'SP'"));
        assert!(text.contains("NIS: '0001'"));
        assert!(text.contains("Nome: 'maria'"));
        assert!(text.contains("field 3: 'extra'"));
    }
}
