// Parse entry points
//
// Every entry point converges on one lifecycle: acquire a tokenizer, resolve
// a parser, run it against a fresh collector, and close the tokenizer exactly
// once whatever happened.

use crate::collector::MetadataCollector;
use crate::error::{Error, Result};
use crate::model::AudioMetadata;
use crate::options::ParseOptions;
use crate::parser::{ParserId, TokenParser, SNIFF_LEN};
use crate::tokenizer::{BufferTokenizer, FileTokenizer, StreamTokenizer, Tokenizer};
use std::path::Path;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

/// Parse a file on disk. The parser is chosen by extension before the file
/// is opened.
pub async fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<AudioMetadata> {
    let path = path.as_ref();
    let parser_id = ParserId::from_path(path).ok_or_else(|| unsupported_path(path))?;
    debug!(path = %path.display(), parser = %parser_id, "parsing file");

    let tokenizer = FileTokenizer::open(path).await?;
    parse_with(tokenizer, Some(parser_id), options).await
}

/// Parse a forward-only async stream
pub async fn parse_stream<R>(
    reader: R,
    mime_type: Option<&str>,
    options: &ParseOptions,
) -> Result<AudioMetadata>
where
    R: AsyncRead + Unpin + Send,
{
    parse_from_tokenizer(StreamTokenizer::new(reader, mime_type), options).await
}

/// Parse an in-memory buffer
pub async fn parse_buffer(
    data: &[u8],
    mime_type: Option<&str>,
    options: &ParseOptions,
) -> Result<AudioMetadata> {
    parse_from_tokenizer(BufferTokenizer::new(data, mime_type), options).await
}

/// Parse from any tokenizer. The parser is resolved from the MIME type, then
/// the path extension, then the leading bytes. The tokenizer is closed before
/// this returns.
pub async fn parse_from_tokenizer<T: Tokenizer>(
    tokenizer: T,
    options: &ParseOptions,
) -> Result<AudioMetadata> {
    parse_with(tokenizer, None, options).await
}

async fn parse_with<T: Tokenizer>(
    mut tokenizer: T,
    parser_id: Option<ParserId>,
    options: &ParseOptions,
) -> Result<AudioMetadata> {
    if tokenizer.total_size().is_none() {
        if let Some(size) = options.file_size {
            tokenizer.set_total_size(size);
        }
    }

    let outcome = match parser_id {
        Some(id) => run(id, &mut tokenizer, options).await,
        None => match resolve(&mut tokenizer).await {
            Ok(id) => run(id, &mut tokenizer, options).await,
            Err(err) => Err(err),
        },
    };
    release(&mut tokenizer, outcome).await
}

async fn resolve(tokenizer: &mut dyn Tokenizer) -> Result<ParserId> {
    let info = tokenizer.file_info();
    if let Some(id) = info.mime_type.as_deref().and_then(ParserId::from_mime_type) {
        debug!(parser = %id, "resolved parser from MIME type");
        return Ok(id);
    }
    if let Some(id) = info.path.as_deref().and_then(ParserId::from_path) {
        debug!(parser = %id, "resolved parser from extension");
        return Ok(id);
    }

    let mime_type = info.mime_type.clone();
    let mut head = [0u8; SNIFF_LEN];
    let len = tokenizer.peek(&mut head).await?;
    match ParserId::sniff(&head[..len]) {
        Some(id) => {
            debug!(parser = %id, "resolved parser from content");
            Ok(id)
        }
        None => Err(Error::unsupported(match mime_type {
            Some(mime) => format!("MIME type: {}", mime),
            None => "unrecognized content".to_string(),
        })),
    }
}

async fn run(
    parser_id: ParserId,
    tokenizer: &mut dyn Tokenizer,
    options: &ParseOptions,
) -> Result<AudioMetadata> {
    let mut parser = load_parser(parser_id, options)?;
    let mut metadata = MetadataCollector::new(options);
    parser.parse(&mut metadata, tokenizer, options).await?;
    Ok(metadata.to_common_metadata())
}

/// A custom loader wins; it falls back to the built-in set when it declines
fn load_parser(parser_id: ParserId, options: &ParseOptions) -> Result<Box<dyn TokenParser>> {
    options
        .load_parser
        .as_ref()
        .and_then(|load| load(parser_id))
        .or_else(|| parser_id.builtin())
        .ok_or_else(|| Error::unsupported(format!("no parser available for {}", parser_id)))
}

/// Close the tokenizer and settle the outcome. A close failure takes over the
/// result and keeps any parse failure as `original`.
async fn release(
    tokenizer: &mut dyn Tokenizer,
    outcome: Result<AudioMetadata>,
) -> Result<AudioMetadata> {
    match (tokenizer.close().await, outcome) {
        (Ok(()), outcome) => {
            debug!("tokenizer released");
            outcome
        }
        (Err(source), Ok(_)) => {
            warn!(error = %source, "failed to release tokenizer");
            Err(Error::ResourceRelease {
                source,
                original: None,
            })
        }
        (Err(source), Err(original)) => {
            warn!(
                error = %source,
                original = %original,
                "failed to release tokenizer after parse failure"
            );
            Err(Error::ResourceRelease {
                source,
                original: Some(Box::new(original)),
            })
        }
    }
}

fn unsupported_path(path: &Path) -> Error {
    match path.extension() {
        Some(ext) => Error::unsupported(format!("extension: .{}", ext.to_string_lossy())),
        None => Error::unsupported(format!("no file extension: {}", path.display())),
    }
}
