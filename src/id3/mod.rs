// MPEG trailer handling
//
// Only the ID3v1 trailer is read; MPEG frames and ID3v2 headers are left to
// parsers supplied through `ParseOptions::load_parser`.

pub mod v1;

pub use v1::Id3v1Tag;

use crate::collector::MetadataCollector;
use crate::error::Result;
use crate::model::{FormatField, TagType};
use crate::options::ParseOptions;
use crate::parser::TokenParser;
use crate::tokenizer::Tokenizer;
use async_trait::async_trait;
use tracing::debug;

pub struct Id3v1Parser;

#[async_trait]
impl TokenParser for Id3v1Parser {
    async fn parse(
        &mut self,
        metadata: &mut MetadataCollector,
        tokenizer: &mut dyn Tokenizer,
        options: &ParseOptions,
    ) -> Result<()> {
        metadata.set_format(FormatField::Container("MPEG".to_string()));

        if options.skip_post_headers {
            debug!("skipping ID3v1 trailer");
            return Ok(());
        }
        let Some(total) = tokenizer.total_size() else {
            debug!("size unknown, cannot locate ID3v1 trailer");
            return Ok(());
        };
        let tag_start = match total.checked_sub(Id3v1Tag::TAG_SIZE as u64) {
            Some(start) if start >= tokenizer.position() => start,
            _ => return Ok(()),
        };

        let gap = tag_start - tokenizer.position();
        tokenizer.skip(gap).await?;
        let mut buffer = [0u8; Id3v1Tag::TAG_SIZE];
        tokenizer.read_exact(&mut buffer).await?;

        if let Some(tag) = Id3v1Tag::parse(&buffer) {
            report_tag(metadata, tag);
        }
        Ok(())
    }
}

fn report_tag(metadata: &mut MetadataCollector, tag: Id3v1Tag) {
    let genre = tag.genre_name();
    let text_fields = [
        ("title", tag.title),
        ("artist", tag.artist),
        ("album", tag.album),
        ("year", tag.year),
        ("comment", tag.comment),
    ];
    for (id, value) in text_fields {
        if !value.is_empty() {
            metadata.add_native_tag(TagType::Id3v1, id, value);
        }
    }
    if let Some(track) = tag.track {
        metadata.add_native_tag(TagType::Id3v1, "track", i64::from(track));
    }
    if let Some(genre) = genre {
        metadata.add_native_tag(TagType::Id3v1, "genre", genre);
    }
}
