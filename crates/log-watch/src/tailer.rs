//! Incremental log reads.
//!
//! Each poll reopens the file, seeks to the last offset and reads to the end.
//! No handle is kept between polls so rotation and deletion never leave a
//! stale descriptor behind.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::WatchError;

/// A single line read from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// Valid UTF-8 text, without its line terminator.
    Text(String),
    /// Bytes that did not decode as UTF-8.
    Garbled,
}

/// Lines appended since the previous read and the offset to resume from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailRead {
    pub lines: Vec<LogLine>,
    pub offset: u64,
}

/// Reads everything appended to `path` after byte `offset`.
///
/// A trailing line without a terminator is returned as-is and the offset moves
/// past it; the companion app flushes whole lines.
pub fn read_new(path: &Path, offset: u64) -> Result<TailRead, WatchError> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let start = if offset > len {
        tracing::warn!(
            file = %path.display(),
            offset,
            len,
            "log file shrank below read offset, rereading from start"
        );
        0
    } else {
        offset
    };

    file.seek(SeekFrom::Start(start))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;

    Ok(TailRead {
        lines: split_lines(&buf),
        offset: start + buf.len() as u64,
    })
}

fn split_lines(buf: &[u8]) -> Vec<LogLine> {
    buf.split_inclusive(|b| *b == b'\n')
        .map(|raw| {
            let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
            raw.strip_suffix(b"\r").unwrap_or(raw)
        })
        .filter(|raw| !raw.is_empty())
        .map(|raw| match std::str::from_utf8(raw) {
            Ok(text) => LogLine::Text(text.to_owned()),
            Err(_) => LogLine::Garbled,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn append(path: &Path, bytes: &[u8]) {
        let mut file = File::options().append(true).open(path).unwrap();
        file.write_all(bytes).unwrap();
    }

    fn text(s: &str) -> LogLine {
        LogLine::Text(s.to_string())
    }

    #[test]
    fn reads_whole_file_from_zero() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        append(tmp.path(), b"first\nsecond\r\n");

        let read = read_new(tmp.path(), 0).unwrap();
        assert_eq!(read.lines, vec![text("first"), text("second")]);
        assert_eq!(read.offset, 14);
    }

    #[test]
    fn reads_only_appended_bytes() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        append(tmp.path(), b"old line\n");
        let first = read_new(tmp.path(), 0).unwrap();

        append(tmp.path(), b"new line\n");
        let second = read_new(tmp.path(), first.offset).unwrap();
        assert_eq!(second.lines, vec![text("new line")]);
        assert_eq!(second.offset, 18);
    }

    #[test]
    fn no_growth_is_idempotent() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        append(tmp.path(), b"line\n");
        let offset = read_new(tmp.path(), 0).unwrap().offset;

        for _ in 0..2 {
            let read = read_new(tmp.path(), offset).unwrap();
            assert!(read.lines.is_empty());
            assert_eq!(read.offset, offset);
        }
    }

    #[test]
    fn invalid_utf8_becomes_garbled() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        append(tmp.path(), b"ok\n\xff\xfe broken\nafter\n");

        let read = read_new(tmp.path(), 0).unwrap();
        assert_eq!(read.lines, vec![text("ok"), LogLine::Garbled, text("after")]);
    }

    #[test]
    fn unterminated_tail_is_consumed() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        append(tmp.path(), b"done\npartial");

        let read = read_new(tmp.path(), 0).unwrap();
        assert_eq!(read.lines, vec![text("done"), text("partial")]);
        assert_eq!(read.offset, 12);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        append(tmp.path(), b"\n\r\nvalue\n\n");

        let read = read_new(tmp.path(), 0).unwrap();
        assert_eq!(read.lines, vec![text("value")]);
    }

    #[test]
    fn offset_past_end_restarts() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        append(tmp.path(), b"short\n");

        let read = read_new(tmp.path(), 500).unwrap();
        assert_eq!(read.lines, vec![text("short")]);
        assert_eq!(read.offset, 6);
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_new(&tmp.path().join("gone.txt"), 0).unwrap_err();
        assert!(matches!(err, WatchError::Io(_)));
    }
}
