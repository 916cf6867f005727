// Parse options

use crate::model::MetadataEvent;
use crate::parser::{ParserId, TokenParser};
use std::fmt;
use std::sync::Arc;

/// Receives one event per tag the collector accepts
pub type Observer = Arc<dyn Fn(&MetadataEvent) + Send + Sync>;

/// Supplies a parser for a resolved id, replacing the built-in set
pub type LoadParser = Arc<dyn Fn(ParserId) -> Option<Box<dyn TokenParser>> + Send + Sync>;

/// Options passed through to the collector and the parser
#[derive(Clone, Default)]
pub struct ParseOptions {
    /// Total size of the source when the source cannot tell
    pub file_size: Option<u64>,
    /// Keep native tags in the result
    pub native: bool,
    /// Hint for custom parsers that can only find the duration by scanning
    /// the whole stream. The built-in parsers never scan.
    pub duration: bool,
    /// Do not decode embedded pictures
    pub skip_covers: bool,
    /// Do not scan trailing headers; only safe for non-seekable sources
    pub skip_post_headers: bool,
    pub load_parser: Option<LoadParser>,
    pub observer: Option<Observer>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }

    pub fn native(mut self, native: bool) -> Self {
        self.native = native;
        self
    }

    pub fn duration(mut self, duration: bool) -> Self {
        self.duration = duration;
        self
    }

    pub fn skip_covers(mut self, skip: bool) -> Self {
        self.skip_covers = skip;
        self
    }

    pub fn skip_post_headers(mut self, skip: bool) -> Self {
        self.skip_post_headers = skip;
        self
    }

    pub fn load_parser<F>(mut self, loader: F) -> Self
    where
        F: Fn(ParserId) -> Option<Box<dyn TokenParser>> + Send + Sync + 'static,
    {
        self.load_parser = Some(Arc::new(loader));
        self
    }

    pub fn observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&MetadataEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("file_size", &self.file_size)
            .field("native", &self.native)
            .field("duration", &self.duration)
            .field("skip_covers", &self.skip_covers)
            .field("skip_post_headers", &self.skip_post_headers)
            .field("load_parser", &self.load_parser.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
