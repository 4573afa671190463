//! Length-prefixed message framing over a byte stream.
//!
//! A message is a 4-byte big-endian length header followed by exactly that
//! many body bytes. The length is capped so a hostile or corrupt header
//! can't make a reader allocate an unbounded buffer before it ever sees a
//! malformed body.

use crate::error::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// No single message may claim a body larger than this. A client that
/// sends a bigger length is speaking a different protocol, not making a
/// large but legitimate request.
pub const MAX_MESSAGE_BYTES: u32 = 1 << 20;

/// Read one length-prefixed message. `Ok(None)` means the peer closed the
/// connection cleanly between messages (EOF exactly at the length header).
pub fn read_message(stream: &mut impl Read) -> Result<Option<Vec<u8>>, Error> {
    let len = match stream.read_u32::<BigEndian>() {
        Ok(len) => len,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(Error::Io(e)),
    };
    if len > MAX_MESSAGE_BYTES {
        return Err(Error::Protocol(format!(
            "message length {len} exceeds cap of {MAX_MESSAGE_BYTES} bytes"
        )));
    }
    let mut body = vec![0u8; len as usize];
    stream.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Write one length-prefixed message. Fails with `Error::Programmer` if the
/// caller hands it a body that could never be read back -- that is a bug in
/// the caller, not a condition a peer can trigger.
pub fn write_message(stream: &mut impl Write, body: &[u8]) -> Result<(), Error> {
    let len = u32::try_from(body.len()).map_err(|_| {
        Error::Programmer(format!("message body of {} bytes does not fit in u32", body.len()))
    })?;
    if len > MAX_MESSAGE_BYTES {
        return Err(Error::Programmer(format!(
            "message body of {len} bytes exceeds cap of {MAX_MESSAGE_BYTES} bytes"
        )));
    }
    stream.write_u32::<BigEndian>(len)?;
    stream.write_all(body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_message() {
        let mut buf = Vec::new();
        write_message(&mut buf, b"hello").unwrap();
        let mut cursor = Cursor::new(buf);
        let read = read_message(&mut cursor).unwrap();
        assert_eq!(read, Some(b"hello".to_vec()));
    }

    #[test]
    fn empty_stream_reads_as_none() {
        let mut cursor = Cursor::new(Vec::new());
        assert_eq!(read_message(&mut cursor).unwrap(), None);
    }

    #[test]
    fn rejects_a_length_header_over_the_cap() {
        let mut buf = Vec::new();
        buf.write_u32::<BigEndian>(MAX_MESSAGE_BYTES + 1).unwrap();
        let mut cursor = Cursor::new(buf);
        assert!(read_message(&mut cursor).is_err());
    }

    #[test]
    fn two_messages_in_sequence_round_trip_independently() {
        let mut buf = Vec::new();
        write_message(&mut buf, b"first").unwrap();
        write_message(&mut buf, b"second").unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_message(&mut cursor).unwrap(), Some(b"first".to_vec()));
        assert_eq!(read_message(&mut cursor).unwrap(), Some(b"second".to_vec()));
        assert_eq!(read_message(&mut cursor).unwrap(), None);
    }
}
