// FLAC PICTURE block, also used base64-encoded in METADATA_BLOCK_PICTURE comments

use crate::model::Picture;
use crate::utils::io::{read_be_u32, read_string};

/// FLAC picture types (ID3v2 APIC numbering)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PictureType {
    Other = 0,
    FileIcon = 1,
    OtherFileIcon = 2,
    CoverFront = 3,
    CoverBack = 4,
    LeafletPage = 5,
    Media = 6,
    LeadArtist = 7,
    Artist = 8,
    Conductor = 9,
    Band = 10,
    Composer = 11,
    Lyricist = 12,
    RecordingLocation = 13,
    DuringRecording = 14,
    DuringPerformance = 15,
    VideoScreenCapture = 16,
    BrightColouredFish = 17,
    Illustration = 18,
    BandLogo = 19,
    PublisherLogo = 20,
}

impl PictureType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            _ => PictureType::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File Icon",
            PictureType::OtherFileIcon => "Other File Icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording Location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
        }
    }
}

/// FLAC PICTURE block structure
#[derive(Debug)]
pub struct FlacPicture {
    pub picture_type: PictureType,
    pub mime_type: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub colors: u32,
    pub data: Vec<u8>,
}

impl FlacPicture {
    /// Read FLAC PICTURE block from data
    pub fn read_from_data(data: &[u8]) -> std::io::Result<Self> {
        let mut cursor = std::io::Cursor::new(data);

        let picture_type = PictureType::from_u32(read_be_u32(&mut cursor)?);
        let mime_length = read_be_u32(&mut cursor)? as usize;
        let mime_type = read_string(&mut cursor, mime_length)?;
        let desc_length = read_be_u32(&mut cursor)? as usize;
        let description = read_string(&mut cursor, desc_length)?;
        let width = read_be_u32(&mut cursor)?;
        let height = read_be_u32(&mut cursor)?;
        let depth = read_be_u32(&mut cursor)?;
        let colors = read_be_u32(&mut cursor)?;

        let data_length = read_be_u32(&mut cursor)? as usize;
        let start = cursor.position() as usize;
        let picture_data = data
            .get(start..start + data_length)
            .ok_or(std::io::ErrorKind::UnexpectedEof)?
            .to_vec();

        Ok(FlacPicture {
            picture_type,
            mime_type,
            description,
            width,
            height,
            depth,
            colors,
            data: picture_data,
        })
    }

    pub fn into_picture(self) -> Picture {
        Picture {
            format: self.mime_type,
            data: self.data,
            description: (!self.description.is_empty()).then_some(self.description),
            picture_type: Some(self.picture_type.label().to_string()),
        }
    }
}
