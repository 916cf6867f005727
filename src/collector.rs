// Per-parse metadata accumulator
//
// Parsers report native tags and format properties here. The collector keeps
// the native tags in arrival order, maps each onto the common tags, and
// notifies the observer once per accepted tag.

use crate::mapping::{self, CommonField};
use crate::model::{
    AudioMetadata, ChangeKind, ChangedTag, CommonTags, FormatField, FormatInfo, MetadataEvent,
    NativeTag, NativeTags, Rating, TagType, TagValue,
};
use crate::options::{Observer, ParseOptions};
use crate::utils::join_artists;
use std::collections::HashMap;
use tracing::debug;

pub struct MetadataCollector {
    include_native: bool,
    skip_covers: bool,
    observer: Option<Observer>,
    format: FormatInfo,
    native: NativeTags,
    common: CommonTags,
    /// Priority of the tag type that set each singleton field
    origin: HashMap<CommonField, u8>,
    /// Artist values from the tag type that currently owns `artist`
    artist_run: Vec<String>,
}

impl MetadataCollector {
    pub fn new(options: &ParseOptions) -> Self {
        MetadataCollector {
            include_native: options.native,
            skip_covers: options.skip_covers,
            observer: options.observer.clone(),
            format: FormatInfo::default(),
            native: NativeTags::default(),
            common: CommonTags::default(),
            origin: HashMap::new(),
            artist_run: Vec::new(),
        }
    }

    /// Parsers may use this to avoid decoding picture payloads at all
    pub fn skip_covers(&self) -> bool {
        self.skip_covers
    }

    pub fn format(&self) -> &FormatInfo {
        &self.format
    }

    pub fn common(&self) -> &CommonTags {
        &self.common
    }

    pub fn native(&self) -> &NativeTags {
        &self.native
    }

    /// Accept a native tag. Returns false when the tag was dropped
    /// (pictures while `skip_covers` is set).
    pub fn add_native_tag(
        &mut self,
        tag_type: TagType,
        id: impl Into<String>,
        value: impl Into<TagValue>,
    ) -> bool {
        let tag = NativeTag::new(id, value);
        if self.skip_covers && tag.value.is_picture() {
            debug!(tag_type = %tag_type, id = %tag.id, "skipping picture");
            return false;
        }

        if self.native.push(&tag_type, tag.clone()) {
            self.format.tag_types.push(tag_type.clone());
        }

        let field = mapping::map_native(&tag_type, &tag.id);
        if let Some(field) = field {
            self.set_common(&tag_type, field, &tag.value);
        }

        let id = field.map(|f| f.as_str().to_string()).unwrap_or(tag.id);
        self.notify(ChangeKind::Common, id, tag.value);
        true
    }

    /// Set one format property
    pub fn set_format(&mut self, field: FormatField) {
        let id = field.id().to_string();
        let value = field.value();
        self.format.apply(field);
        self.notify(ChangeKind::Format, id, value);
    }

    /// The accumulated result. Reading it does not change the collector.
    pub fn to_common_metadata(&self) -> AudioMetadata {
        AudioMetadata {
            format: self.format.clone(),
            native: if self.include_native {
                self.native.clone()
            } else {
                NativeTags::default()
            },
            common: self.common.clone(),
        }
    }

    fn notify(&self, kind: ChangeKind, id: String, value: TagValue) {
        if let Some(observer) = &self.observer {
            let event = MetadataEvent {
                tag: ChangedTag { kind, id, value },
                metadata: self.to_common_metadata(),
            };
            observer(&event);
        }
    }

    /// Claim a singleton field for `tag_type`; false if a higher-priority
    /// tag type already owns it
    fn claim(&mut self, field: CommonField, tag_type: &TagType) -> bool {
        let priority = tag_type.priority();
        match self.origin.get(&field) {
            Some(&owner) if owner < priority => false,
            _ => {
                self.origin.insert(field, priority);
                true
            }
        }
    }

    fn set_common(&mut self, tag_type: &TagType, field: CommonField, value: &TagValue) {
        match field {
            CommonField::Picture => {
                if let TagValue::Picture(picture) = value {
                    self.common.picture.push(picture.clone());
                }
                return;
            }
            CommonField::Rating => {
                let rating = match value {
                    TagValue::Rating(rating) => Some(rating.clone()),
                    other => other.to_f64().map(|rating| Rating { source: None, rating }),
                };
                if let Some(rating) = rating {
                    self.common.rating.push(rating);
                }
                return;
            }
            _ => {}
        }

        let Some(text) = value.to_text() else {
            debug!(field = field.as_str(), "non-text value for text field");
            return;
        };

        if field == CommonField::Artist {
            self.set_artist(tag_type, text);
            return;
        }

        if !field.is_singleton() {
            let list = match field {
                CommonField::Artists => {
                    push_unique(&mut self.common.artists, text);
                    return;
                }
                CommonField::Genre => &mut self.common.genre,
                CommonField::Comment => &mut self.common.comment,
                CommonField::Composer => &mut self.common.composer,
                CommonField::Lyricist => &mut self.common.lyricist,
                CommonField::Lyrics => &mut self.common.lyrics,
                CommonField::Label => &mut self.common.label,
                CommonField::Isrc => &mut self.common.isrc,
                CommonField::Description => &mut self.common.description,
                CommonField::Subtitle => &mut self.common.subtitle,
                CommonField::MusicBrainzArtistId => &mut self.common.musicbrainz_artistid,
                CommonField::MusicBrainzAlbumArtistId => {
                    &mut self.common.musicbrainz_albumartistid
                }
                _ => return,
            };
            list.push(text);
            return;
        }

        if matches!(field, CommonField::Date | CommonField::OriginalDate) {
            self.set_date(tag_type, field, text);
            return;
        }

        if !self.claim(field, tag_type) {
            return;
        }

        let common = &mut self.common;
        match field {
            CommonField::Title => common.title = Some(text),
            CommonField::AlbumArtist => common.albumartist = Some(text),
            CommonField::Album => common.album = Some(text),
            CommonField::Year => {
                if let Some(year) = mapping::parse_year(&text) {
                    common.year = Some(year);
                }
            }
            CommonField::Track => {
                let (no, of) = mapping::parse_position(&text);
                common.track.no = no.or(common.track.no);
                common.track.of = of.or(common.track.of);
            }
            CommonField::TrackTotal => {
                common.track.of = text.trim().parse().ok().or(common.track.of);
            }
            CommonField::Disk => {
                let (no, of) = mapping::parse_position(&text);
                common.disk.no = no.or(common.disk.no);
                common.disk.of = of.or(common.disk.of);
            }
            CommonField::DiskTotal => {
                common.disk.of = text.trim().parse().ok().or(common.disk.of);
            }
            CommonField::Compilation => {
                common.compilation = Some(matches!(text.trim(), "1" | "true" | "TRUE" | "True"));
            }
            CommonField::Bpm => {
                if let Some(bpm) = value.to_f64() {
                    common.bpm = Some(bpm);
                }
            }
            CommonField::Copyright => common.copyright = Some(text),
            CommonField::EncodedBy => common.encodedby = Some(text),
            CommonField::Grouping => common.grouping = Some(text),
            CommonField::Media => common.media = Some(text),
            CommonField::Language => common.language = Some(text),
            CommonField::TitleSort => common.titlesort = Some(text),
            CommonField::ArtistSort => common.artistsort = Some(text),
            CommonField::AlbumSort => common.albumsort = Some(text),
            CommonField::MusicBrainzRecordingId => common.musicbrainz_recordingid = Some(text),
            CommonField::MusicBrainzTrackId => common.musicbrainz_trackid = Some(text),
            CommonField::MusicBrainzAlbumId => common.musicbrainz_albumid = Some(text),
            CommonField::MusicBrainzReleaseGroupId => {
                common.musicbrainz_releasegroupid = Some(text)
            }
            CommonField::ReleaseStatus => common.releasestatus = Some(text),
            CommonField::ReleaseCountry => common.releasecountry = Some(text),
            _ => {}
        }
    }

    /// Dates also carry the year, which follows the same priority as an
    /// explicit year tag
    fn set_date(&mut self, tag_type: &TagType, field: CommonField, text: String) {
        if let Some(year) = mapping::parse_year(&text) {
            if self.claim(CommonField::Year, tag_type) {
                self.common.year = Some(year);
            }
        }
        if !self.claim(field, tag_type) {
            return;
        }
        match field {
            CommonField::Date => self.common.date = Some(text),
            _ => self.common.originaldate = Some(text),
        }
    }

    /// Repeated artist tags from one tag type combine into a display string
    fn set_artist(&mut self, tag_type: &TagType, name: String) {
        push_unique(&mut self.common.artists, name.clone());

        let priority = tag_type.priority();
        match self.origin.get(&CommonField::Artist) {
            Some(&owner) if owner < priority => {}
            Some(&owner) if owner == priority => {
                self.artist_run.push(name);
                self.common.artist = Some(join_artists(&self.artist_run));
            }
            _ => {
                self.origin.insert(CommonField::Artist, priority);
                self.artist_run = vec![name.clone()];
                self.common.artist = Some(name);
            }
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Picture, TrackNo};
    use std::sync::{Arc, Mutex};

    fn collector() -> MetadataCollector {
        MetadataCollector::new(&ParseOptions::new().native(true))
    }

    fn cover() -> Picture {
        Picture {
            format: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8],
            description: None,
            picture_type: Some("Cover (front)".to_string()),
        }
    }

    #[test]
    fn test_vorbis_tags_map_to_common() {
        let mut c = collector();
        c.add_native_tag(TagType::Vorbis, "TITLE", "Song");
        c.add_native_tag(TagType::Vorbis, "ALBUM", "Record");
        c.add_native_tag(TagType::Vorbis, "TRACKNUMBER", "3/12");
        c.add_native_tag(TagType::Vorbis, "DISCNUMBER", "1");
        c.add_native_tag(TagType::Vorbis, "DISCTOTAL", "2");
        c.add_native_tag(TagType::Vorbis, "DATE", "2021-06-01");
        c.add_native_tag(TagType::Vorbis, "GENRE", "Rock");
        c.add_native_tag(TagType::Vorbis, "GENRE", "Pop");

        let common = c.common();
        assert_eq!(common.title.as_deref(), Some("Song"));
        assert_eq!(common.album.as_deref(), Some("Record"));
        assert_eq!(common.track, TrackNo { no: Some(3), of: Some(12) });
        assert_eq!(common.disk, TrackNo { no: Some(1), of: Some(2) });
        assert_eq!(common.year, Some(2021));
        assert_eq!(common.date.as_deref(), Some("2021-06-01"));
        assert_eq!(common.genre, vec!["Rock", "Pop"]);
        assert_eq!(c.format().tag_types, vec![TagType::Vorbis]);
    }

    #[test]
    fn test_repeated_artists_are_joined() {
        let mut c = collector();
        for name in ["A", "B", "C"] {
            c.add_native_tag(TagType::Vorbis, "ARTIST", name);
        }
        assert_eq!(c.common().artist.as_deref(), Some("A, B & C"));
        assert_eq!(c.common().artists, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_higher_priority_tag_type_wins() {
        let mut c = collector();
        c.add_native_tag(TagType::Vorbis, "TITLE", "From Vorbis");
        c.add_native_tag(TagType::Id3v1, "title", "From ID3v1");
        c.add_native_tag(TagType::Id3v1, "artist", "Someone");
        assert_eq!(c.common().title.as_deref(), Some("From Vorbis"));
        assert_eq!(c.common().artist.as_deref(), Some("Someone"));
        // native tags from both types are kept
        assert_eq!(c.native().len(), 2);
        assert_eq!(c.format().tag_types, vec![TagType::Vorbis, TagType::Id3v1]);
    }

    #[test]
    fn test_year_follows_date_priority() {
        let mut c = collector();
        c.add_native_tag(TagType::Vorbis, "DATE", "2021-05-01");
        c.add_native_tag(TagType::Id3v1, "year", "1999");
        assert_eq!(c.common().year, Some(2021));
        assert_eq!(c.common().date.as_deref(), Some("2021-05-01"));

        let mut c = collector();
        c.add_native_tag(TagType::Id3v1, "year", "1999");
        c.add_native_tag(TagType::Vorbis, "DATE", "2021-05-01");
        assert_eq!(c.common().year, Some(2021));
        assert_eq!(c.common().date.as_deref(), Some("2021-05-01"));
    }

    #[test]
    fn test_same_priority_overwrites() {
        let mut c = collector();
        c.add_native_tag(TagType::Vorbis, "TITLE", "First");
        c.add_native_tag(TagType::Vorbis, "TITLE", "Second");
        assert_eq!(c.common().title.as_deref(), Some("Second"));
    }

    #[test]
    fn test_pictures_and_ratings() {
        let mut c = collector();
        assert!(c.add_native_tag(TagType::Vorbis, "METADATA_BLOCK_PICTURE", cover()));
        c.add_native_tag(
            TagType::Vorbis,
            "RATING:me",
            Rating { source: Some("me".into()), rating: 0.8 },
        );
        assert_eq!(c.common().picture, vec![cover()]);
        assert_eq!(c.common().rating[0].rating, 0.8);
    }

    #[test]
    fn test_skip_covers_drops_pictures() {
        let mut c = MetadataCollector::new(&ParseOptions::new().skip_covers(true).native(true));
        assert!(!c.add_native_tag(TagType::Vorbis, "METADATA_BLOCK_PICTURE", cover()));
        assert!(c.common().picture.is_empty());
        assert!(c.native().is_empty());
    }

    #[test]
    fn test_native_omitted_unless_requested() {
        let mut c = MetadataCollector::new(&ParseOptions::new());
        c.add_native_tag(TagType::Vorbis, "TITLE", "Song");
        let metadata = c.to_common_metadata();
        assert!(metadata.native.is_empty());
        assert_eq!(metadata.common.title.as_deref(), Some("Song"));
    }

    #[test]
    fn test_unmapped_tag_is_still_native() {
        let mut c = collector();
        c.add_native_tag(TagType::Vorbis, "CUSTOM_FIELD", "x");
        assert_eq!(c.common(), &CommonTags::default());
        assert_eq!(c.native().get(&TagType::Vorbis).unwrap()[0].id, "CUSTOM_FIELD");
    }

    #[test]
    fn test_events_follow_acceptance_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let options = ParseOptions::new()
            .native(true)
            .observer(move |event| sink.lock().unwrap().push(event.clone()));
        let mut c = MetadataCollector::new(&options);

        c.add_native_tag(TagType::Vorbis, "TITLE", "Song");
        c.set_format(FormatField::SampleRate(44100));
        c.add_native_tag(TagType::Vorbis, "X_UNKNOWN", 5i64);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].tag.kind, ChangeKind::Common);
        assert_eq!(events[0].tag.id, "title");
        assert_eq!(events[0].metadata.common.title.as_deref(), Some("Song"));
        assert_eq!(events[0].metadata.format.sample_rate, None);
        assert_eq!(events[1].tag.kind, ChangeKind::Format);
        assert_eq!(events[1].tag.id, "sample_rate");
        assert_eq!(events[2].tag.id, "X_UNKNOWN");
        assert_eq!(events[2].metadata, c.to_common_metadata());
    }

    #[test]
    fn test_to_common_metadata_is_idempotent() {
        let mut c = collector();
        c.add_native_tag(TagType::Vorbis, "TITLE", "Song");
        assert_eq!(c.to_common_metadata(), c.to_common_metadata());
    }
}
