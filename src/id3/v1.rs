// ID3v1 tag implementation

use crate::utils::encoding::{decode_fixed, TextEncoding};

/// ID3v1 tag structure
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Id3v1Tag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    /// ID3v1.1 track number
    pub track: Option<u8>,
    pub genre: u8,
}

impl Id3v1Tag {
    pub const TAG_SIZE: usize = 128;
    const TAG_ID: [u8; 3] = [b'T', b'A', b'G'];

    /// Parse the trailing 128 bytes of a file; `None` without a `TAG` header
    pub fn parse(buffer: &[u8; Self::TAG_SIZE]) -> Option<Self> {
        if buffer[0..3] != Self::TAG_ID {
            return None;
        }

        // ID3v1.1 keeps a track number in the last two comment bytes
        let (comment, track) = if buffer[125] == 0 && buffer[126] != 0 {
            (Self::parse_string(&buffer[97..125]), Some(buffer[126]))
        } else {
            (Self::parse_string(&buffer[97..127]), None)
        };

        Some(Id3v1Tag {
            title: Self::parse_string(&buffer[3..33]),
            artist: Self::parse_string(&buffer[33..63]),
            album: Self::parse_string(&buffer[63..93]),
            year: Self::parse_string(&buffer[93..97]),
            comment,
            track,
            genre: buffer[127],
        })
    }

    /// Genre name, if the index is in the Winamp-extended table
    pub fn genre_name(&self) -> Option<&'static str> {
        GENRES.get(usize::from(self.genre)).copied()
    }

    fn parse_string(bytes: &[u8]) -> String {
        decode_fixed(bytes, TextEncoding::Latin1)
    }
}

const GENRES: &[&str] = &[
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge", "Hip-Hop", "Jazz",
    "Metal", "New Age", "Oldies", "Other", "Pop", "R&B", "Rap", "Reggae", "Rock", "Techno",
    "Industrial", "Alternative", "Ska", "Death Metal", "Pranks", "Soundtrack", "Euro-Techno",
    "Ambient", "Trip-Hop", "Vocal", "Jazz+Funk", "Fusion", "Trance", "Classical", "Instrumental",
    "Acid", "House", "Game", "Sound Clip", "Gospel", "Noise", "Alt. Rock", "Bass", "Soul",
    "Punk", "Space", "Meditative", "Instrumental Pop", "Instrumental Rock", "Ethnic", "Gothic",
    "Darkwave", "Techno-Industrial", "Electronic", "Pop-Folk", "Eurodance", "Dream",
    "Southern Rock", "Comedy", "Cult", "Gangsta Rap", "Top 40", "Christian Rap", "Pop/Funk",
    "Jungle", "Native American", "Cabaret", "New Wave", "Psychedelic", "Rave", "Showtunes",
    "Trailer", "Lo-Fi", "Tribal", "Acid Punk", "Acid Jazz", "Polka", "Retro", "Musical",
    "Rock & Roll", "Hard Rock", "Folk", "Folk/Rock", "National Folk", "Swing", "Fast-Fusion",
    "Bebob", "Latin", "Revival", "Celtic", "Bluegrass", "Avantgarde", "Gothic Rock",
    "Progressive Rock", "Psychedelic Rock", "Symphonic Rock", "Slow Rock", "Big Band", "Chorus",
    "Easy Listening", "Acoustic", "Humour", "Speech", "Chanson", "Opera", "Chamber Music",
    "Sonata", "Symphony", "Booty Bass", "Primus", "Porn Groove", "Satire", "Slow Jam", "Club",
    "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul", "Freestyle", "Duet",
    "Punk Rock", "Drum Solo", "A Cappella", "Euro-House", "Dance Hall", "Goa", "Drum & Bass",
    "Club-House", "Hardcore", "Terror", "Indie", "BritPop", "Negerpunk", "Polsk Punk", "Beat",
    "Christian Gangsta Rap", "Heavy Metal", "Black Metal", "Crossover", "Contemporary Christian",
    "Christian Rock", "Merengue", "Salsa", "Thrash Metal", "Anime", "JPop", "Synthpop",
    "Abstract", "Art Rock", "Baroque", "Bhangra", "Big Beat", "Breakbeat", "Chillout",
    "Downtempo", "Dub", "EBM", "Eclectic", "Electro", "Electroclash", "Emo", "Experimental",
    "Garage", "Global", "IDM", "Illbient", "Industro-Goth", "Jam Band", "Krautrock", "Leftfield",
    "Lounge", "Math Rock", "New Romantic", "Nu-Breakz", "Post-Punk", "Post-Rock", "Psytrance",
    "Shoegaze", "Space Rock", "Trop Rock", "World Music", "Neoclassical", "Audiobook",
    "Audio Theatre", "Neue Deutsche Welle", "Podcast", "Indie Rock", "G-Funk", "Dubstep",
    "Garage Rock", "Psybient",
];
