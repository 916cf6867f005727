// Parser identities and resolution
//
// A parser is chosen by file extension (for paths) or by MIME type falling
// back to the leading bytes (for streams and buffers).

use crate::collector::MetadataCollector;
use crate::error::Result;
use crate::options::ParseOptions;
use crate::tokenizer::Tokenizer;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Bytes `ParserId::sniff` wants to see
pub const SNIFF_LEN: usize = 16;

/// A container parser. The parser reads through `tokenizer` and reports
/// everything it finds to `metadata`; it must not close the tokenizer.
#[async_trait]
pub trait TokenParser: Send {
    async fn parse(
        &mut self,
        metadata: &mut MetadataCollector,
        tokenizer: &mut dyn Tokenizer,
        options: &ParseOptions,
    ) -> Result<()>;
}

/// Container formats a parser can be resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserId {
    Apev2,
    Asf,
    Aiff,
    Dsdiff,
    Dsf,
    Flac,
    Mp4,
    Mpeg,
    Musepack,
    Ogg,
    Riff,
    WavPack,
}

impl ParserId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserId::Apev2 => "apev2",
            ParserId::Asf => "asf",
            ParserId::Aiff => "aiff",
            ParserId::Dsdiff => "dsdiff",
            ParserId::Dsf => "dsf",
            ParserId::Flac => "flac",
            ParserId::Mp4 => "mp4",
            ParserId::Mpeg => "mpeg",
            ParserId::Musepack => "musepack",
            ParserId::Ogg => "ogg",
            ParserId::Riff => "riff",
            ParserId::WavPack => "wavpack",
        }
    }

    /// Resolve from a file extension, with or without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        let id = match ext.as_str() {
            "mp2" | "mp3" | "m2a" | "aac" => ParserId::Mpeg,
            "ape" => ParserId::Apev2,
            "aif" | "aiff" | "aifc" => ParserId::Aiff,
            "asf" | "wma" | "wmv" => ParserId::Asf,
            "dff" => ParserId::Dsdiff,
            "dsf" => ParserId::Dsf,
            "flac" => ParserId::Flac,
            "mp4" | "m4a" | "m4b" | "m4pa" | "m4v" | "m4r" | "3gp" => ParserId::Mp4,
            "mpc" => ParserId::Musepack,
            "ogg" | "ogv" | "oga" | "ogm" | "ogx" | "opus" | "spx" => ParserId::Ogg,
            "wav" => ParserId::Riff,
            "wv" | "wvp" => ParserId::WavPack,
            _ => return None,
        };
        Some(id)
    }

    /// Resolve from the extension of `path`
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Resolve from a MIME type; parameters such as `; codecs=...` are ignored
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let id = match essence.as_str() {
            "audio/mpeg" | "audio/mp3" | "audio/mpa" | "audio/aac" | "audio/aacp" => ParserId::Mpeg,
            "audio/flac" | "audio/x-flac" => ParserId::Flac,
            "audio/ogg" | "application/ogg" | "video/ogg" | "audio/opus" | "audio/vorbis"
            | "audio/speex" => ParserId::Ogg,
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "video/mp4" => ParserId::Mp4,
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => ParserId::Riff,
            "audio/aiff" | "audio/x-aiff" => ParserId::Aiff,
            "audio/x-ms-wma" | "video/x-ms-asf" | "video/x-ms-wmv" => ParserId::Asf,
            "audio/ape" | "audio/x-ape" | "audio/monkeys-audio" | "audio/x-monkeys-audio" => {
                ParserId::Apev2
            }
            "audio/wavpack" | "audio/x-wavpack" => ParserId::WavPack,
            "audio/musepack" | "audio/x-musepack" => ParserId::Musepack,
            "audio/dsf" | "audio/x-dsf" => ParserId::Dsf,
            "audio/x-dff" => ParserId::Dsdiff,
            _ => return None,
        };
        Some(id)
    }

    /// Recognize a container from its leading bytes
    pub fn sniff(head: &[u8]) -> Option<Self> {
        const ASF_GUID: [u8; 8] = [0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11];

        if has_magic(head, 0, b"ID3") {
            Some(ParserId::Mpeg)
        } else if has_magic(head, 0, b"fLaC") {
            Some(ParserId::Flac)
        } else if has_magic(head, 0, b"OggS") {
            Some(ParserId::Ogg)
        } else if has_magic(head, 0, b"RIFF") && has_magic(head, 8, b"WAVE") {
            Some(ParserId::Riff)
        } else if has_magic(head, 0, b"FORM")
            && (has_magic(head, 8, b"AIFF") || has_magic(head, 8, b"AIFC"))
        {
            Some(ParserId::Aiff)
        } else if has_magic(head, 4, b"ftyp") {
            Some(ParserId::Mp4)
        } else if has_magic(head, 0, b"MAC ") || has_magic(head, 0, b"APETAGEX") {
            Some(ParserId::Apev2)
        } else if has_magic(head, 0, b"wvpk") {
            Some(ParserId::WavPack)
        } else if has_magic(head, 0, b"MPCK") || has_magic(head, 0, b"MP+") {
            Some(ParserId::Musepack)
        } else if has_magic(head, 0, &ASF_GUID) {
            Some(ParserId::Asf)
        } else if has_magic(head, 0, b"DSD ") {
            Some(ParserId::Dsf)
        } else if has_magic(head, 0, b"FRM8") {
            Some(ParserId::Dsdiff)
        } else if head.len() >= 2 && head[0] == 0xFF && head[1] & 0xE0 == 0xE0 {
            Some(ParserId::Mpeg)
        } else {
            None
        }
    }

    /// The parser shipped with this crate, if any
    pub fn builtin(self) -> Option<Box<dyn TokenParser>> {
        match self {
            ParserId::Flac => Some(Box::new(crate::flac::FlacParser)),
            ParserId::Mpeg => Some(Box::new(crate::id3::Id3v1Parser)),
            _ => None,
        }
    }
}

fn has_magic(head: &[u8], offset: usize, magic: &[u8]) -> bool {
    head.get(offset..offset + magic.len()) == Some(magic)
}

impl fmt::Display for ParserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_resolution() {
        assert_eq!(ParserId::from_extension(".mp3"), Some(ParserId::Mpeg));
        assert_eq!(ParserId::from_extension("FLAC"), Some(ParserId::Flac));
        assert_eq!(ParserId::from_extension("opus"), Some(ParserId::Ogg));
        assert_eq!(ParserId::from_extension("xyz"), None);
        assert_eq!(ParserId::from_path(Path::new("/music/a.M4A")), Some(ParserId::Mp4));
        assert_eq!(ParserId::from_path(Path::new("/music/noext")), None);
    }

    #[test]
    fn test_mime_resolution() {
        assert_eq!(ParserId::from_mime_type("audio/flac"), Some(ParserId::Flac));
        assert_eq!(ParserId::from_mime_type("Audio/MPEG"), Some(ParserId::Mpeg));
        assert_eq!(ParserId::from_mime_type("audio/ogg; codecs=opus"), Some(ParserId::Ogg));
        assert_eq!(ParserId::from_mime_type("text/plain"), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(ParserId::sniff(b"fLaC\0\0\0\x22"), Some(ParserId::Flac));
        assert_eq!(ParserId::sniff(b"ID3\x04\0"), Some(ParserId::Mpeg));
        assert_eq!(ParserId::sniff(b"RIFF\0\0\0\0WAVEfmt "), Some(ParserId::Riff));
        assert_eq!(ParserId::sniff(b"\0\0\0\x20ftypM4A "), Some(ParserId::Mp4));
        assert_eq!(ParserId::sniff(&[0xFF, 0xFB, 0x90, 0x64]), Some(ParserId::Mpeg));
        assert_eq!(ParserId::sniff(b"RIFF"), None);
        assert_eq!(ParserId::sniff(b""), None);
    }

    #[test]
    fn test_builtin_parsers() {
        assert!(ParserId::Flac.builtin().is_some());
        assert!(ParserId::Mpeg.builtin().is_some());
        assert!(ParserId::Mp4.builtin().is_none());
    }
}
