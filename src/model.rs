// Unified metadata model
//
// Every parser writes into these types and every consumer reads them,
// regardless of which container the tags came from.

use base64::Engine;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

fn serialize_bytes<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
}

fn serialize_md5<S: Serializer>(md5: &Option<[u8; 16]>, serializer: S) -> Result<S::Ok, S::Error> {
    match md5 {
        Some(hash) => {
            let hex: String = hash.iter().map(|b| format!("{:02x}", b)).collect();
            serializer.serialize_some(&hex)
        }
        None => serializer.serialize_none(),
    }
}

/// Tag vocabulary a native tag belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagType {
    Matroska,
    Apev2,
    Vorbis,
    Id3v24,
    Id3v23,
    Id3v22,
    Exif,
    Asf,
    Itunes,
    Aiff,
    Id3v1,
    /// Tag type reported by a custom parser
    Other(String),
}

impl TagType {
    /// Name as it appears in `FormatInfo::tag_types` and the native map
    pub fn as_str(&self) -> &str {
        match self {
            TagType::Matroska => "matroska",
            TagType::Apev2 => "APEv2",
            TagType::Vorbis => "vorbis",
            TagType::Id3v24 => "ID3v2.4",
            TagType::Id3v23 => "ID3v2.3",
            TagType::Id3v22 => "ID3v2.2",
            TagType::Exif => "exif",
            TagType::Asf => "asf",
            TagType::Itunes => "iTunes",
            TagType::Aiff => "AIFF",
            TagType::Id3v1 => "ID3v1",
            TagType::Other(name) => name,
        }
    }

    /// Lower value wins when two tag types supply the same singleton field
    pub fn priority(&self) -> u8 {
        match self {
            TagType::Matroska => 0,
            TagType::Apev2 => 1,
            TagType::Vorbis => 2,
            TagType::Id3v24 => 3,
            TagType::Id3v23 => 4,
            TagType::Id3v22 => 5,
            TagType::Exif => 6,
            TagType::Asf => 7,
            TagType::Itunes => 8,
            TagType::Aiff => 9,
            TagType::Id3v1 => 10,
            TagType::Other(_) => 11,
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TagType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Embedded picture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Picture {
    /// MIME type, e.g. `image/jpeg`
    pub format: String,
    #[serde(serialize_with = "serialize_bytes")]
    pub data: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub picture_type: Option<String>,
}

impl Picture {
    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.format.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            _ => "jpg",
        }
    }
}

/// Normalized rating in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub rating: f64,
}

/// Value of a native tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    #[serde(serialize_with = "serialize_bytes")]
    Bytes(Vec<u8>),
    Picture(Picture),
    Rating(Rating),
    List(Vec<TagValue>),
}

impl TagValue {
    /// Textual form of scalar values; `None` for binary and nested values
    pub fn to_text(&self) -> Option<String> {
        match self {
            TagValue::Text(s) => Some(s.clone()),
            TagValue::Integer(n) => Some(n.to_string()),
            TagValue::Float(n) => Some(n.to_string()),
            TagValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Numeric form, parsing text when needed
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            TagValue::Integer(n) => Some(*n as f64),
            TagValue::Float(n) => Some(*n),
            TagValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_picture(&self) -> bool {
        matches!(self, TagValue::Picture(_))
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Text(s)
    }
}

impl From<i64> for TagValue {
    fn from(n: i64) -> Self {
        TagValue::Integer(n)
    }
}

impl From<f64> for TagValue {
    fn from(n: f64) -> Self {
        TagValue::Float(n)
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        TagValue::Bool(b)
    }
}

impl From<Vec<u8>> for TagValue {
    fn from(data: Vec<u8>) -> Self {
        TagValue::Bytes(data)
    }
}

impl From<Picture> for TagValue {
    fn from(picture: Picture) -> Self {
        TagValue::Picture(picture)
    }
}

impl From<Rating> for TagValue {
    fn from(rating: Rating) -> Self {
        TagValue::Rating(rating)
    }
}

/// A tag exactly as the container stores it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeTag {
    pub id: String,
    pub value: TagValue,
}

impl NativeTag {
    pub fn new(id: impl Into<String>, value: impl Into<TagValue>) -> Self {
        NativeTag {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Native tags per tag type, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeTags {
    entries: Vec<(TagType, Vec<NativeTag>)>,
}

impl NativeTags {
    /// Append a tag; returns true when this is the first tag of its type
    pub fn push(&mut self, tag_type: &TagType, tag: NativeTag) -> bool {
        if let Some((_, tags)) = self.entries.iter_mut().find(|(t, _)| t == tag_type) {
            tags.push(tag);
            false
        } else {
            self.entries.push((tag_type.clone(), vec![tag]));
            true
        }
    }

    pub fn get(&self, tag_type: &TagType) -> Option<&[NativeTag]> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag_type)
            .map(|(_, tags)| tags.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagType, &[NativeTag])> {
        self.entries.iter().map(|(t, tags)| (t, tags.as_slice()))
    }

    /// Number of tag types present
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NativeTags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tag_type, tags) in &self.entries {
            map.serialize_entry(tag_type.as_str(), tags)?;
        }
        map.end()
    }
}

/// Native tag values grouped by id, ids in order of first appearance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeTagDict {
    entries: Vec<(String, Vec<TagValue>)>,
}

impl NativeTagDict {
    pub(crate) fn append(&mut self, id: &str, value: TagValue) {
        match self.entries.iter_mut().find(|(k, _)| k == id) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((id.to_string(), vec![value])),
        }
    }

    pub fn get(&self, id: &str) -> Option<&[TagValue]> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, values)| values.as_slice())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TagValue])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NativeTagDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, values) in &self.entries {
            map.serialize_entry(id, values)?;
        }
        map.end()
    }
}

/// Container and codec properties
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormatInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    pub tag_types: Vec<TagType>,
    /// Seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Bits per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bits_per_sample: Option<u32>,
    /// Encoder name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lossless: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_samples: Option<u64>,
    #[serde(serialize_with = "serialize_md5", skip_serializing_if = "Option::is_none")]
    pub audio_md5: Option<[u8; 16]>,
}

/// A single `FormatInfo` update reported by a parser
#[derive(Debug, Clone, PartialEq)]
pub enum FormatField {
    Container(String),
    Duration(f64),
    Bitrate(f64),
    SampleRate(u32),
    BitsPerSample(u32),
    Tool(String),
    Codec(String),
    CodecProfile(String),
    Lossless(bool),
    NumberOfChannels(u32),
    NumberOfSamples(u64),
    AudioMd5([u8; 16]),
}

impl FormatField {
    pub fn id(&self) -> &'static str {
        match self {
            FormatField::Container(_) => "container",
            FormatField::Duration(_) => "duration",
            FormatField::Bitrate(_) => "bitrate",
            FormatField::SampleRate(_) => "sample_rate",
            FormatField::BitsPerSample(_) => "bits_per_sample",
            FormatField::Tool(_) => "tool",
            FormatField::Codec(_) => "codec",
            FormatField::CodecProfile(_) => "codec_profile",
            FormatField::Lossless(_) => "lossless",
            FormatField::NumberOfChannels(_) => "number_of_channels",
            FormatField::NumberOfSamples(_) => "number_of_samples",
            FormatField::AudioMd5(_) => "audio_md5",
        }
    }

    pub fn value(&self) -> TagValue {
        match self {
            FormatField::Container(s)
            | FormatField::Tool(s)
            | FormatField::Codec(s)
            | FormatField::CodecProfile(s) => TagValue::Text(s.clone()),
            FormatField::Duration(n) | FormatField::Bitrate(n) => TagValue::Float(*n),
            FormatField::SampleRate(n)
            | FormatField::BitsPerSample(n)
            | FormatField::NumberOfChannels(n) => TagValue::Integer(i64::from(*n)),
            FormatField::NumberOfSamples(n) => TagValue::Integer(*n as i64),
            FormatField::Lossless(b) => TagValue::Bool(*b),
            FormatField::AudioMd5(hash) => TagValue::Bytes(hash.to_vec()),
        }
    }
}

impl FormatInfo {
    /// Set the field named by `field`
    pub fn apply(&mut self, field: FormatField) {
        match field {
            FormatField::Container(v) => self.container = Some(v),
            FormatField::Duration(v) => self.duration = Some(v),
            FormatField::Bitrate(v) => self.bitrate = Some(v),
            FormatField::SampleRate(v) => self.sample_rate = Some(v),
            FormatField::BitsPerSample(v) => self.bits_per_sample = Some(v),
            FormatField::Tool(v) => self.tool = Some(v),
            FormatField::Codec(v) => self.codec = Some(v),
            FormatField::CodecProfile(v) => self.codec_profile = Some(v),
            FormatField::Lossless(v) => self.lossless = Some(v),
            FormatField::NumberOfChannels(v) => self.number_of_channels = Some(v),
            FormatField::NumberOfSamples(v) => self.number_of_samples = Some(v),
            FormatField::AudioMd5(v) => self.audio_md5 = Some(v),
        }
    }
}

/// Position within a set, e.g. track 3 of 12
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackNo {
    pub no: Option<u32>,
    pub of: Option<u32>,
}

/// Format-agnostic tags
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommonTags {
    pub track: TrackNo,
    pub disk: TrackNo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub albumartist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originaldate: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genre: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub picture: Vec<Picture>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rating: Vec<Rating>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comment: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub composer: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lyricist: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lyrics: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub label: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub isrc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtitle: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compilation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encodedby: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titlesort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artistsort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub albumsort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musicbrainz_recordingid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musicbrainz_trackid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musicbrainz_albumid: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub musicbrainz_artistid: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub musicbrainz_albumartistid: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musicbrainz_releasegroupid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub releasestatus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub releasecountry: Option<String>,
}

/// The result of a parse
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioMetadata {
    pub format: FormatInfo,
    #[serde(skip_serializing_if = "NativeTags::is_empty")]
    pub native: NativeTags,
    pub common: CommonTags,
}

/// Which part of the metadata an event updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Common,
    Format,
}

/// The tag that triggered a `MetadataEvent`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangedTag {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub id: String,
    pub value: TagValue,
}

/// Emitted once per accepted tag, with the metadata as of that tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataEvent {
    pub tag: ChangedTag,
    pub metadata: AudioMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_defaults() {
        let common = CommonTags::default();
        assert_eq!(common.track, TrackNo { no: None, of: None });
        assert_eq!(common.disk, TrackNo { no: None, of: None });
        assert!(common.genre.is_empty());
        assert!(common.title.is_none());
    }

    #[test]
    fn test_native_tags_keep_order_and_repeats() {
        let mut native = NativeTags::default();
        assert!(native.push(&TagType::Vorbis, NativeTag::new("COMMENT", "one")));
        assert!(!native.push(&TagType::Vorbis, NativeTag::new("COMMENT", "two")));
        assert!(native.push(&TagType::Id3v1, NativeTag::new("title", "t")));

        let vorbis = native.get(&TagType::Vorbis).unwrap();
        assert_eq!(vorbis.len(), 2);
        assert_eq!(vorbis[1].value, TagValue::from("two"));
        let types: Vec<_> = native.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(types, vec!["vorbis", "ID3v1"]);
    }

    #[test]
    fn test_serialize_bytes_as_base64() {
        let picture = Picture {
            format: "image/png".to_string(),
            data: vec![1, 2, 3],
            description: None,
            picture_type: Some("Cover (front)".to_string()),
        };
        let json = serde_json::to_value(&picture).unwrap();
        assert_eq!(json["data"], "AQID");
        assert_eq!(json["type"], "Cover (front)");
        assert!(json.get("description").is_none());
        assert_eq!(picture.extension(), "png");
    }

    #[test]
    fn test_native_serializes_in_insertion_order() {
        let mut native = NativeTags::default();
        native.push(&TagType::Vorbis, NativeTag::new("TITLE", "x"));
        native.push(&TagType::Id3v1, NativeTag::new("title", "y"));
        let json = serde_json::to_string(&native).unwrap();
        assert!(json.find("vorbis").unwrap() < json.find("ID3v1").unwrap());
    }

    #[test]
    fn test_format_apply_and_md5_hex() {
        let mut format = FormatInfo::default();
        format.apply(FormatField::SampleRate(44100));
        format.apply(FormatField::AudioMd5([0xab; 16]));
        assert_eq!(format.sample_rate, Some(44100));
        let json = serde_json::to_value(&format).unwrap();
        assert_eq!(json["audio_md5"], "ab".repeat(16));
        assert_eq!(FormatField::SampleRate(8000).value(), TagValue::Integer(8000));
    }

    #[test]
    fn test_format_field_ids_match_serialized_keys() {
        let fields = [
            FormatField::Container("FLAC".into()),
            FormatField::Duration(1.0),
            FormatField::Bitrate(8.0),
            FormatField::SampleRate(44100),
            FormatField::BitsPerSample(16),
            FormatField::Tool("libFLAC".into()),
            FormatField::Codec("FLAC".into()),
            FormatField::CodecProfile("CDDA".into()),
            FormatField::Lossless(true),
            FormatField::NumberOfChannels(2),
            FormatField::NumberOfSamples(44100),
            FormatField::AudioMd5([1; 16]),
        ];
        for field in fields {
            let id = field.id();
            let mut format = FormatInfo::default();
            format.apply(field);
            let json = serde_json::to_value(&format).unwrap();
            assert!(json.get(id).is_some(), "{id} is not a serialized key");
        }
    }

    #[test]
    fn test_tag_value_conversions() {
        assert_eq!(TagValue::from("12").to_f64(), Some(12.0));
        assert_eq!(TagValue::Integer(7).to_text().as_deref(), Some("7"));
        assert_eq!(TagValue::Bytes(vec![0]).to_text(), None);
    }
}
