// FLAC parser
//
// Reads the metadata blocks in front of the audio frames: STREAMINFO feeds the
// format, VORBIS_COMMENT and PICTURE blocks feed the tags. Audio frames are
// never read.

pub mod metadata;
pub mod picture;
pub mod vorbis;

pub use metadata::{FlacMetadataBlockHeader, FlacMetadataBlockType, StreamInfo, FLAC_SIGNATURE};
pub use picture::FlacPicture;
pub use vorbis::VorbisComment;

use crate::collector::MetadataCollector;
use crate::error::{Error, Result};
use crate::model::{FormatField, Rating, TagType, TagValue};
use crate::options::ParseOptions;
use crate::parser::TokenParser;
use crate::tokenizer::Tokenizer;
use async_trait::async_trait;
use base64::Engine;
use std::io::Cursor;
use tracing::{debug, warn};

const PICTURE_FIELD: &str = "METADATA_BLOCK_PICTURE";

pub struct FlacParser;

#[async_trait]
impl TokenParser for FlacParser {
    async fn parse(
        &mut self,
        metadata: &mut MetadataCollector,
        tokenizer: &mut dyn Tokenizer,
        _options: &ParseOptions,
    ) -> Result<()> {
        skip_id3v2_header(tokenizer).await?;

        let mut signature = [0u8; 4];
        tokenizer.read_exact(&mut signature).await?;
        if &signature != FLAC_SIGNATURE {
            return Err(Error::decode("Invalid FLAC preamble"));
        }
        metadata.set_format(FormatField::Container("FLAC".to_string()));
        metadata.set_format(FormatField::Codec("FLAC".to_string()));
        metadata.set_format(FormatField::Lossless(true));

        let mut duration = None;
        loop {
            let mut header = [0u8; FlacMetadataBlockHeader::SIZE];
            tokenizer.read_exact(&mut header).await?;
            let header = FlacMetadataBlockHeader::parse(&header);

            match header.block_type {
                FlacMetadataBlockType::StreamInfo => {
                    let data = read_block(tokenizer, header.length).await?;
                    let info = StreamInfo::parse(&data)?;
                    duration = info.duration();
                    report_stream_info(metadata, &info);
                }
                FlacMetadataBlockType::VorbisComment => {
                    let data = read_block(tokenizer, header.length).await?;
                    let comment = VorbisComment::read(&mut Cursor::new(&data)).map_err(|e| {
                        Error::decode(format!("Invalid VORBIS_COMMENT block: {}", e))
                    })?;
                    report_comments(metadata, comment);
                }
                FlacMetadataBlockType::Picture if !metadata.skip_covers() => {
                    let data = read_block(tokenizer, header.length).await?;
                    let picture = FlacPicture::read_from_data(&data)
                        .map_err(|e| Error::decode(format!("Invalid PICTURE block: {}", e)))?;
                    metadata.add_native_tag(TagType::Vorbis, PICTURE_FIELD, picture.into_picture());
                }
                FlacMetadataBlockType::Invalid => {
                    return Err(Error::decode("Invalid FLAC metadata block type 127"));
                }
                other => {
                    debug!(block = ?other, length = header.length, "skipping FLAC block");
                    tokenizer.skip(u64::from(header.length)).await?;
                }
            }

            if header.is_last {
                break;
            }
        }

        // Audio frames follow the last metadata block
        if let (Some(duration), Some(total)) = (duration, tokenizer.total_size()) {
            let audio_bytes = total.saturating_sub(tokenizer.position());
            if duration > 0.0 && audio_bytes > 0 {
                metadata.set_format(FormatField::Bitrate(audio_bytes as f64 * 8.0 / duration));
            }
        }

        Ok(())
    }
}

async fn read_block(tokenizer: &mut dyn Tokenizer, length: u32) -> Result<Vec<u8>> {
    let mut data = vec![0u8; length as usize];
    tokenizer.read_exact(&mut data).await?;
    Ok(data)
}

/// Some encoders put an ID3v2 tag in front of the FLAC signature
async fn skip_id3v2_header(tokenizer: &mut dyn Tokenizer) -> Result<()> {
    let mut header = [0u8; 10];
    if tokenizer.peek(&mut header).await? < header.len() || &header[..3] != b"ID3" {
        return Ok(());
    }
    tokenizer.read_exact(&mut header).await?;
    let size = header[6..10]
        .iter()
        .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F));
    debug!(size, "skipping ID3v2 header in FLAC stream");
    tokenizer.skip(size).await?;
    Ok(())
}

fn report_stream_info(metadata: &mut MetadataCollector, info: &StreamInfo) {
    metadata.set_format(FormatField::SampleRate(info.sample_rate));
    metadata.set_format(FormatField::NumberOfChannels(info.channels));
    metadata.set_format(FormatField::BitsPerSample(info.bits_per_sample));
    if info.total_samples > 0 {
        metadata.set_format(FormatField::NumberOfSamples(info.total_samples));
    }
    if let Some(duration) = info.duration() {
        metadata.set_format(FormatField::Duration(duration));
    }
    if info.md5 != [0u8; 16] {
        metadata.set_format(FormatField::AudioMd5(info.md5));
    }
}

fn report_comments(metadata: &mut MetadataCollector, comment: VorbisComment) {
    if !comment.vendor_string.is_empty() {
        metadata.set_format(FormatField::Tool(comment.vendor_string));
    }

    for (field, value) in comment.comments {
        let upper = field.to_ascii_uppercase();
        if upper == PICTURE_FIELD {
            if metadata.skip_covers() {
                continue;
            }
            match decode_picture_comment(&value) {
                Some(picture) => {
                    metadata.add_native_tag(TagType::Vorbis, field, picture);
                }
                None => warn!("ignoring malformed {} comment", PICTURE_FIELD),
            }
        } else if upper == "RATING" || upper.starts_with("RATING:") {
            metadata.add_native_tag(TagType::Vorbis, field.clone(), parse_rating(&field, &value));
        } else {
            metadata.add_native_tag(TagType::Vorbis, field, value);
        }
    }
}

fn decode_picture_comment(value: &str) -> Option<TagValue> {
    let block = base64::engine::general_purpose::STANDARD
        .decode(value.trim())
        .ok()?;
    let picture = FlacPicture::read_from_data(&block).ok()?;
    Some(TagValue::Picture(picture.into_picture()))
}

/// Vorbis ratings are stored as 0..=100, optionally as `RATING:<user>`
fn parse_rating(field: &str, value: &str) -> TagValue {
    match value.trim().parse::<f64>() {
        Ok(score) => TagValue::Rating(Rating {
            source: field.split_once(':').map(|(_, user)| user.to_string()),
            rating: score / 100.0,
        }),
        Err(_) => TagValue::Text(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::metadata::tests::stream_info_bytes;
    use super::picture::tests::picture_block;
    use super::vorbis::tests::comment_block;
    use super::*;
    use crate::tokenizer::BufferTokenizer;

    fn block(block_type: u8, is_last: bool, body: &[u8]) -> Vec<u8> {
        let len = (body.len() as u32).to_be_bytes();
        let mut out = vec![block_type | if is_last { 0x80 } else { 0 }, len[1], len[2], len[3]];
        out.extend_from_slice(body);
        out
    }

    fn flac_file(comments: &[&str], audio_len: usize) -> Vec<u8> {
        let mut file = FLAC_SIGNATURE.to_vec();
        file.extend(block(0, false, &stream_info_bytes(441_000)));
        file.extend(block(1, false, &[0u8; 8]));
        file.extend(block(4, false, &comment_block("libFLAC", comments)));
        file.extend(block(6, true, &picture_block("image/jpeg", "front", &[0xFF, 0xD8])));
        file.extend(vec![0u8; audio_len]);
        file
    }

    async fn parse(data: &[u8], options: &ParseOptions) -> Result<MetadataCollector> {
        let mut collector = MetadataCollector::new(options);
        let mut tokenizer = BufferTokenizer::new(data, None);
        FlacParser.parse(&mut collector, &mut tokenizer, options).await?;
        Ok(collector)
    }

    #[tokio::test]
    async fn test_parse_flac_blocks() {
        let data = flac_file(&["TITLE=Song", "ARTIST=A", "ARTIST=B", "RATING:me=80"], 1000);
        let collector = parse(&data, &ParseOptions::new()).await.unwrap();

        let format = collector.format();
        assert_eq!(format.container.as_deref(), Some("FLAC"));
        assert_eq!(format.sample_rate, Some(44100));
        assert_eq!(format.number_of_channels, Some(2));
        assert_eq!(format.duration, Some(10.0));
        assert_eq!(format.tool.as_deref(), Some("libFLAC"));
        assert_eq!(format.lossless, Some(true));
        assert_eq!(format.bitrate, Some(800.0));

        let common = collector.common();
        assert_eq!(common.title.as_deref(), Some("Song"));
        assert_eq!(common.artist.as_deref(), Some("A & B"));
        assert_eq!(common.picture.len(), 1);
        assert_eq!(common.picture[0].description.as_deref(), Some("front"));
        assert_eq!(common.rating[0].source.as_deref(), Some("me"));
        assert!((common.rating[0].rating - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_skip_covers() {
        let data = flac_file(&["TITLE=Song"], 0);
        let collector = parse(&data, &ParseOptions::new().skip_covers(true)).await.unwrap();
        assert!(collector.common().picture.is_empty());
        assert_eq!(collector.common().title.as_deref(), Some("Song"));
    }

    #[tokio::test]
    async fn test_id3v2_prefix_is_skipped() {
        let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x04".to_vec();
        data.extend_from_slice(&[0u8; 4]);
        data.extend(flac_file(&["ALBUM=Record"], 0));
        let collector = parse(&data, &ParseOptions::new()).await.unwrap();
        assert_eq!(collector.common().album.as_deref(), Some("Record"));
    }

    #[tokio::test]
    async fn test_invalid_preamble() {
        let err = parse(b"OggS0000", &ParseOptions::new()).await.err().unwrap();
        assert_eq!(err.to_string(), "Invalid FLAC preamble");
    }

    #[tokio::test]
    async fn test_truncated_block_is_io_error() {
        let data = flac_file(&["TITLE=Song"], 0);
        let err = parse(&data[..20], &ParseOptions::new()).await.err().unwrap();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_picture_comment_roundtrip() {
        let block = picture_block("image/png", "", &[1, 2]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(block);
        match decode_picture_comment(&encoded) {
            Some(TagValue::Picture(picture)) => assert_eq!(picture.data, vec![1, 2]),
            other => panic!("unexpected value: {other:?}"),
        }
        assert!(decode_picture_comment("not base64!").is_none());
    }
}
