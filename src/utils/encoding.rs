// Text decoding for tag fields

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Text encodings used by the built-in parsers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextEncoding {
    /// ISO-8859-1, decoded as its Windows-1252 superset
    Latin1,
    Utf8,
}

/// Decode text with specified encoding
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Latin1 => WINDOWS_1252.decode(data).0.into_owned(),
        TextEncoding::Utf8 => UTF_8.decode(data).0.into_owned(),
    }
}

/// Decode a fixed-width field padded with NULs or spaces
pub fn decode_fixed(field: &[u8], encoding: TextEncoding) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    decode_text(&field[..end], encoding).trim().to_string()
}
