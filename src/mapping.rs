// Native-to-common field mapping
//
// Each tag vocabulary names the same concept differently:
// - Vorbis comments (FLAC/Ogg): TITLE, ARTIST, TRACKNUMBER, ...
// - ID3v1: fixed fields title, artist, album, year, comment, track, genre
//
// This module resolves a native tag id to the common field it feeds.

use crate::model::TagType;

/// Fields of `CommonTags` a native tag can feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonField {
    Title,
    Artist,
    Artists,
    AlbumArtist,
    Album,
    Year,
    Date,
    OriginalDate,
    Track,
    TrackTotal,
    Disk,
    DiskTotal,
    Genre,
    Picture,
    Rating,
    Comment,
    Composer,
    Lyricist,
    Lyrics,
    Label,
    Isrc,
    Description,
    Subtitle,
    Compilation,
    Bpm,
    Copyright,
    EncodedBy,
    Grouping,
    Media,
    Language,
    TitleSort,
    ArtistSort,
    AlbumSort,
    MusicBrainzRecordingId,
    MusicBrainzTrackId,
    MusicBrainzAlbumId,
    MusicBrainzArtistId,
    MusicBrainzAlbumArtistId,
    MusicBrainzReleaseGroupId,
    ReleaseStatus,
    ReleaseCountry,
}

const ALL_FIELDS: &[CommonField] = &[
    CommonField::Title,
    CommonField::Artist,
    CommonField::Artists,
    CommonField::AlbumArtist,
    CommonField::Album,
    CommonField::Year,
    CommonField::Date,
    CommonField::OriginalDate,
    CommonField::Track,
    CommonField::TrackTotal,
    CommonField::Disk,
    CommonField::DiskTotal,
    CommonField::Genre,
    CommonField::Picture,
    CommonField::Rating,
    CommonField::Comment,
    CommonField::Composer,
    CommonField::Lyricist,
    CommonField::Lyrics,
    CommonField::Label,
    CommonField::Isrc,
    CommonField::Description,
    CommonField::Subtitle,
    CommonField::Compilation,
    CommonField::Bpm,
    CommonField::Copyright,
    CommonField::EncodedBy,
    CommonField::Grouping,
    CommonField::Media,
    CommonField::Language,
    CommonField::TitleSort,
    CommonField::ArtistSort,
    CommonField::AlbumSort,
    CommonField::MusicBrainzRecordingId,
    CommonField::MusicBrainzTrackId,
    CommonField::MusicBrainzAlbumId,
    CommonField::MusicBrainzArtistId,
    CommonField::MusicBrainzAlbumArtistId,
    CommonField::MusicBrainzReleaseGroupId,
    CommonField::ReleaseStatus,
    CommonField::ReleaseCountry,
];

impl CommonField {
    /// Field name as used in `CommonTags` and change events
    pub fn as_str(&self) -> &'static str {
        match self {
            CommonField::Title => "title",
            CommonField::Artist => "artist",
            CommonField::Artists => "artists",
            CommonField::AlbumArtist => "albumartist",
            CommonField::Album => "album",
            CommonField::Year => "year",
            CommonField::Date => "date",
            CommonField::OriginalDate => "originaldate",
            CommonField::Track => "track",
            CommonField::TrackTotal => "totaltracks",
            CommonField::Disk => "disk",
            CommonField::DiskTotal => "totaldiscs",
            CommonField::Genre => "genre",
            CommonField::Picture => "picture",
            CommonField::Rating => "rating",
            CommonField::Comment => "comment",
            CommonField::Composer => "composer",
            CommonField::Lyricist => "lyricist",
            CommonField::Lyrics => "lyrics",
            CommonField::Label => "label",
            CommonField::Isrc => "isrc",
            CommonField::Description => "description",
            CommonField::Subtitle => "subtitle",
            CommonField::Compilation => "compilation",
            CommonField::Bpm => "bpm",
            CommonField::Copyright => "copyright",
            CommonField::EncodedBy => "encodedby",
            CommonField::Grouping => "grouping",
            CommonField::Media => "media",
            CommonField::Language => "language",
            CommonField::TitleSort => "titlesort",
            CommonField::ArtistSort => "artistsort",
            CommonField::AlbumSort => "albumsort",
            CommonField::MusicBrainzRecordingId => "musicbrainz_recordingid",
            CommonField::MusicBrainzTrackId => "musicbrainz_trackid",
            CommonField::MusicBrainzAlbumId => "musicbrainz_albumid",
            CommonField::MusicBrainzArtistId => "musicbrainz_artistid",
            CommonField::MusicBrainzAlbumArtistId => "musicbrainz_albumartistid",
            CommonField::MusicBrainzReleaseGroupId => "musicbrainz_releasegroupid",
            CommonField::ReleaseStatus => "releasestatus",
            CommonField::ReleaseCountry => "releasecountry",
        }
    }

    /// Parse from a common field name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_FIELDS
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }

    /// Singleton fields hold one value; the rest accumulate
    pub fn is_singleton(&self) -> bool {
        !matches!(
            self,
            CommonField::Artists
                | CommonField::Genre
                | CommonField::Picture
                | CommonField::Rating
                | CommonField::Comment
                | CommonField::Composer
                | CommonField::Lyricist
                | CommonField::Lyrics
                | CommonField::Label
                | CommonField::Isrc
                | CommonField::Description
                | CommonField::Subtitle
                | CommonField::MusicBrainzArtistId
                | CommonField::MusicBrainzAlbumArtistId
        )
    }
}

/// Resolve a native tag id to its common field
pub fn map_native(tag_type: &TagType, id: &str) -> Option<CommonField> {
    match tag_type {
        TagType::Vorbis => from_vorbis(id),
        TagType::Id3v1 => from_id3v1(id),
        TagType::Other(_) => CommonField::from_name(id),
        _ => None,
    }
}

/// Convert Vorbis comment key to common field
pub fn from_vorbis(key: &str) -> Option<CommonField> {
    let key = key.to_ascii_uppercase();
    if key == "RATING" || key.starts_with("RATING:") {
        return Some(CommonField::Rating);
    }
    let field = match key.as_str() {
        "TITLE" => CommonField::Title,
        "ARTIST" => CommonField::Artist,
        "ARTISTS" => CommonField::Artists,
        "ALBUMARTIST" | "ALBUM ARTIST" => CommonField::AlbumArtist,
        "ALBUM" => CommonField::Album,
        "DATE" => CommonField::Date,
        "YEAR" => CommonField::Year,
        "ORIGINALDATE" => CommonField::OriginalDate,
        "TRACKNUMBER" => CommonField::Track,
        "TRACKTOTAL" | "TOTALTRACKS" => CommonField::TrackTotal,
        "DISCNUMBER" => CommonField::Disk,
        "DISCTOTAL" | "TOTALDISCS" => CommonField::DiskTotal,
        "GENRE" => CommonField::Genre,
        "METADATA_BLOCK_PICTURE" => CommonField::Picture,
        "COMMENT" => CommonField::Comment,
        "COMPOSER" => CommonField::Composer,
        "LYRICIST" => CommonField::Lyricist,
        "LYRICS" => CommonField::Lyrics,
        "LABEL" | "ORGANIZATION" => CommonField::Label,
        "ISRC" => CommonField::Isrc,
        "DESCRIPTION" => CommonField::Description,
        "SUBTITLE" => CommonField::Subtitle,
        "COMPILATION" => CommonField::Compilation,
        "BPM" => CommonField::Bpm,
        "COPYRIGHT" => CommonField::Copyright,
        "ENCODEDBY" | "ENCODED-BY" => CommonField::EncodedBy,
        "GROUPING" => CommonField::Grouping,
        "MEDIA" => CommonField::Media,
        "LANGUAGE" => CommonField::Language,
        "TITLESORT" => CommonField::TitleSort,
        "ARTISTSORT" => CommonField::ArtistSort,
        "ALBUMSORT" => CommonField::AlbumSort,
        "MUSICBRAINZ_TRACKID" => CommonField::MusicBrainzRecordingId,
        "MUSICBRAINZ_RELEASETRACKID" => CommonField::MusicBrainzTrackId,
        "MUSICBRAINZ_ALBUMID" => CommonField::MusicBrainzAlbumId,
        "MUSICBRAINZ_ARTISTID" => CommonField::MusicBrainzArtistId,
        "MUSICBRAINZ_ALBUMARTISTID" => CommonField::MusicBrainzAlbumArtistId,
        "MUSICBRAINZ_RELEASEGROUPID" => CommonField::MusicBrainzReleaseGroupId,
        "RELEASESTATUS" | "MUSICBRAINZ_ALBUMSTATUS" => CommonField::ReleaseStatus,
        "RELEASECOUNTRY" => CommonField::ReleaseCountry,
        _ => return None,
    };
    Some(field)
}

/// Convert ID3v1 field name to common field
pub fn from_id3v1(id: &str) -> Option<CommonField> {
    match id {
        "title" => Some(CommonField::Title),
        "artist" => Some(CommonField::Artist),
        "album" => Some(CommonField::Album),
        "year" => Some(CommonField::Year),
        "comment" => Some(CommonField::Comment),
        "track" => Some(CommonField::Track),
        "genre" => Some(CommonField::Genre),
        _ => None,
    }
}

/// Year from a date string such as `2024-01-15`
pub fn parse_year(date: &str) -> Option<i32> {
    let date = date.trim();
    date.get(..4).unwrap_or(date).parse().ok()
}

/// Split `"3/12"` into number and total
pub fn parse_position(value: &str) -> (Option<u32>, Option<u32>) {
    let mut parts = value.splitn(2, '/');
    let no = parts.next().and_then(|n| n.trim().parse().ok());
    let of = parts.next().and_then(|n| n.trim().parse().ok());
    (no, of)
}
