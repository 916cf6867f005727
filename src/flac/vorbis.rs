// VORBIS_COMMENT block

use crate::utils::io::{read_le_u32, read_string};
use std::io::Read;

/// Vorbis comment structure
#[derive(Debug, Default)]
pub struct VorbisComment {
    pub vendor_string: String,
    /// `(FIELD, value)` pairs in stored order
    pub comments: Vec<(String, String)>,
}

impl VorbisComment {
    /// Read Vorbis comment from reader
    pub fn read<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let vendor_length = read_le_u32(reader)? as usize;
        let vendor_string = read_string(reader, vendor_length)?;

        let comment_count = read_le_u32(reader)? as usize;
        let mut comments = Vec::with_capacity(comment_count.min(1024));
        for _ in 0..comment_count {
            let comment_length = read_le_u32(reader)? as usize;
            let comment = read_string(reader, comment_length)?;

            // FIELD=value; entries without '=' are not comments
            if let Some((field, value)) = comment.split_once('=') {
                comments.push((field.to_string(), value.to_string()));
            }
        }

        Ok(VorbisComment {
            vendor_string,
            comments,
        })
    }
}
