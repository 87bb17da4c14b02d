//! Wire format spoken between the query master and its workers.
//!
//! Query channel (master -> worker): one [`QueryBuffer`] of exactly
//! [`MAX_WORD`] bytes per input line, NUL padded, with no length prefix.
//!
//! Result channel (worker -> master): a sequence of fixed-size records per
//! query word, ended by the terminator record. Layout per record:
//! - 4 bytes: frequency (u32, native endian; both ends share a host)
//! - [`PATH_LENGTH`] bytes: filename, NUL padded
//!
//! The reader finds the end of a response only by seeing a terminator.

use std::io::{self, Read, Write};

use bytemuck::{Pod, Zeroable};

use crate::limits::{MAX_WORD, PATH_LENGTH};

/// One raw query line as sent on a query channel.
pub type QueryBuffer = [u8; MAX_WORD];

/// Size in bytes of one record on a result channel.
pub const RECORD_SIZE: usize = std::mem::size_of::<WireRecord>();

/// A (frequency, filename) pair. A zero frequency marks the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub frequency: u32,
    pub filename: String,
}

impl ResultRecord {
    pub fn new(frequency: u32, filename: impl Into<String>) -> Self {
        Self {
            frequency,
            filename: filename.into(),
        }
    }

    /// The reserved `(0, "")` record ending one word's response.
    pub fn terminator() -> Self {
        Self {
            frequency: 0,
            filename: String::new(),
        }
    }

    pub fn is_terminator(&self) -> bool {
        self.frequency == 0
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct WireRecord {
    frequency: u32,
    filename: [u8; PATH_LENGTH],
}

impl WireRecord {
    fn encode(record: &ResultRecord) -> Self {
        let mut wire = Self::zeroed();
        wire.frequency = record.frequency;
        fill_padded(&mut wire.filename, truncate_str(&record.filename));
        wire
    }

    fn decode(&self) -> ResultRecord {
        ResultRecord {
            frequency: self.frequency,
            filename: String::from_utf8_lossy(until_nul(&self.filename))
                .into_owned(),
        }
    }
}

/// Write a single record to a result channel.
pub fn write_record<W: Write>(
    out: &mut W,
    record: &ResultRecord,
) -> io::Result<()> {
    let wire = WireRecord::encode(record);
    out.write_all(bytemuck::bytes_of(&wire))
}

/// Read a single record from a result channel.
///
/// End of stream is always an error here: a response is only complete once
/// its terminator has been read.
pub fn read_record<R: Read>(input: &mut R) -> io::Result<ResultRecord> {
    let mut wire = WireRecord::zeroed();
    input.read_exact(bytemuck::bytes_of_mut(&mut wire))?;
    Ok(wire.decode())
}

/// Pack a raw input line into a query buffer.
///
/// The line is forwarded verbatim, line terminator included, but cut to
/// `MAX_WORD - 1` bytes so the buffer always ends in at least one NUL.
pub fn encode_query(line: &[u8]) -> QueryBuffer {
    let mut buf = [0u8; MAX_WORD];
    fill_padded(&mut buf, line);
    buf
}

/// Extract the query word from a received buffer.
///
/// Takes the bytes before the first NUL and strips a single trailing line
/// terminator (`\n` or `\r\n`).
pub fn decode_query(buf: &QueryBuffer) -> String {
    let raw = until_nul(buf);
    let word = raw
        .strip_suffix(b"\r\n".as_slice())
        .or_else(|| raw.strip_suffix(b"\n".as_slice()))
        .unwrap_or(raw);
    String::from_utf8_lossy(word).into_owned()
}

/// Read the next query buffer from a query channel.
///
/// Returns `Ok(None)` when the channel was closed on a buffer boundary,
/// which is how the master signals shutdown.
pub fn read_query<R: Read>(input: &mut R) -> io::Result<Option<QueryBuffer>> {
    let mut buf = [0u8; MAX_WORD];
    let mut filled = 0;

    while filled < MAX_WORD {
        match input.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("query channel closed after {filled} bytes"),
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(Some(buf))
}

/// Copy `src` into `dest`, leaving at least one trailing NUL.
fn fill_padded(dest: &mut [u8], src: &[u8]) {
    let len = src.len().min(dest.len() - 1);
    dest[..len].copy_from_slice(&src[..len]);
    dest[len..].fill(0);
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

/// Cut a filename to the wire field without splitting a UTF-8 sequence.
fn truncate_str(s: &str) -> &[u8] {
    let mut end = s.len().min(PATH_LENGTH - 1);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s.as_bytes()[..end]
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn record_size_is_fixed() {
        assert_eq!(RECORD_SIZE, 4 + PATH_LENGTH);
    }

    #[test]
    fn record_survives_the_wire() {
        let mut buf = Vec::new();
        write_record(&mut buf, &ResultRecord::new(7, "notes/a.txt")).unwrap();
        write_record(&mut buf, &ResultRecord::terminator()).unwrap();
        assert_eq!(buf.len(), 2 * RECORD_SIZE);

        let mut cursor = Cursor::new(buf);
        let first = read_record(&mut cursor).unwrap();
        assert_eq!(first, ResultRecord::new(7, "notes/a.txt"));
        assert!(!first.is_terminator());

        let last = read_record(&mut cursor).unwrap();
        assert!(last.is_terminator());
        assert_eq!(last.filename, "");
    }

    #[test]
    fn long_filename_is_truncated() {
        let long = "é".repeat(PATH_LENGTH);
        let mut buf = Vec::new();
        write_record(&mut buf, &ResultRecord::new(1, long.clone())).unwrap();

        let decoded = read_record(&mut Cursor::new(buf)).unwrap();
        assert!(decoded.filename.len() < PATH_LENGTH);
        assert!(long.starts_with(&decoded.filename));
    }

    #[test]
    fn short_result_stream_is_an_error() {
        let mut buf = Vec::new();
        write_record(&mut buf, &ResultRecord::new(3, "f")).unwrap();
        buf.truncate(RECORD_SIZE / 2);

        let err = read_record(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn query_keeps_line_terminator_until_decoded() {
        let buf = encode_query(b"apple\n");
        assert_eq!(&buf[..6], b"apple\n");
        assert!(buf[6..].iter().all(|&b| b == 0));
        assert_eq!(decode_query(&buf), "apple");
    }

    #[test]
    fn decode_strips_only_one_terminator() {
        assert_eq!(decode_query(&encode_query(b"pear\r\n")), "pear");
        assert_eq!(decode_query(&encode_query(b"pear\n\n")), "pear\n");
        assert_eq!(decode_query(&encode_query(b"pear")), "pear");
        assert_eq!(decode_query(&encode_query(b" pear ")), " pear ");
    }

    #[test]
    fn long_query_is_truncated() {
        let line = [b'a'; MAX_WORD * 2];
        let buf = encode_query(&line);
        assert_eq!(buf[MAX_WORD - 1], 0);
        assert_eq!(decode_query(&buf), "a".repeat(MAX_WORD - 1));
    }

    #[test]
    fn read_query_sees_clean_close() {
        let mut input = Cursor::new(Vec::new());
        assert!(read_query(&mut input).unwrap().is_none());
    }

    #[test]
    fn read_query_reads_consecutive_buffers() {
        let mut bytes = encode_query(b"one\n").to_vec();
        bytes.extend_from_slice(&encode_query(b"two\n"));
        let mut input = Cursor::new(bytes);

        let first = read_query(&mut input).unwrap().unwrap();
        let second = read_query(&mut input).unwrap().unwrap();
        assert_eq!(decode_query(&first), "one");
        assert_eq!(decode_query(&second), "two");
        assert!(read_query(&mut input).unwrap().is_none());
    }

    #[test]
    fn read_query_rejects_partial_buffer() {
        let mut input = Cursor::new(b"half".to_vec());
        let err = read_query(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
