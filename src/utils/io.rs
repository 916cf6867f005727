// Integer readers for parsing metadata blocks held in memory

use super::encoding::{decode_text, TextEncoding};
use std::io::{self, Read};

/// Read big-endian 32-bit integer
pub fn read_be_u32<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_be_bytes(buffer))
}

/// Read little-endian 32-bit integer
pub fn read_le_u32<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

/// Read a UTF-8 string of `len` bytes. The length comes from untrusted
/// input, so nothing is allocated up front.
pub fn read_string<R: Read>(reader: &mut R, len: usize) -> io::Result<String> {
    let mut buffer = Vec::new();
    reader.take(len as u64).read_to_end(&mut buffer)?;
    if buffer.len() < len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(decode_text(&buffer, TextEncoding::Utf8))
}

/// Big-endian 24-bit integer from the first three bytes
pub fn be_u24(bytes: &[u8]) -> u32 {
    (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_endianness() {
        let mut cursor = Cursor::new(vec![0, 0, 1, 0, 0, 1, 0, 0]);
        assert_eq!(read_be_u32(&mut cursor).unwrap(), 256);
        assert_eq!(read_le_u32(&mut cursor).unwrap(), 256);
        assert_eq!(be_u24(&[0x01, 0x00, 0x02]), 0x010002);
    }

    #[test]
    fn test_short_read_fails() {
        let mut cursor = Cursor::new(vec![1, 2]);
        assert!(read_be_u32(&mut cursor).is_err());
    }

    #[test]
    fn test_read_string() {
        let mut cursor = Cursor::new(b"TITLE=Caf\xC3\xA9rest".to_vec());
        assert_eq!(read_string(&mut cursor, 11).unwrap(), "TITLE=Café");
        assert!(read_string(&mut cursor, u32::MAX as usize).is_err());
    }
}
