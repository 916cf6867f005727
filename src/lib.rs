//! tagweave - audio metadata orchestration
//!
//! Drives a per-format parser over a byte source, collects what it reports
//! into one unified model, and always releases the source afterwards.
//!
//! ```no_run
//! # async fn demo() -> tagweave::Result<()> {
//! let options = tagweave::ParseOptions::new().skip_covers(true);
//! let metadata = tagweave::parse_file("song.flac", &options).await?;
//! println!("{:?}", metadata.common.title);
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod core;
pub mod error;
pub mod flac;
pub mod id3;
pub mod mapping;
pub mod model;
pub mod options;
pub mod parser;
pub mod tokenizer;
pub mod utils;

pub use crate::core::{parse_buffer, parse_file, parse_from_tokenizer, parse_stream};
pub use collector::MetadataCollector;
pub use error::{Error, Result};
pub use mapping::CommonField;
pub use model::{
    AudioMetadata, ChangeKind, ChangedTag, CommonTags, FormatField, FormatInfo, MetadataEvent,
    NativeTag, NativeTagDict, NativeTags, Picture, Rating, TagType, TagValue, TrackNo,
};
pub use options::{LoadParser, Observer, ParseOptions};
pub use parser::{ParserId, TokenParser};
pub use tokenizer::{BufferTokenizer, FileInfo, FileTokenizer, StreamTokenizer, Tokenizer};
pub use utils::{group_by_id, join_artists, rating_to_stars};
