// FLAC metadata block headers and STREAMINFO

use crate::error::{Error, Result};
use crate::utils::io::be_u24;

/// FLAC file signature
pub const FLAC_SIGNATURE: &[u8; 4] = b"fLaC";

/// FLAC metadata block types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlacMetadataBlockType {
    StreamInfo,
    Padding,
    Application,
    SeekTable,
    VorbisComment,
    CueSheet,
    Picture,
    Reserved(u8),
    Invalid,
}

impl FlacMetadataBlockType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => FlacMetadataBlockType::StreamInfo,
            1 => FlacMetadataBlockType::Padding,
            2 => FlacMetadataBlockType::Application,
            3 => FlacMetadataBlockType::SeekTable,
            4 => FlacMetadataBlockType::VorbisComment,
            5 => FlacMetadataBlockType::CueSheet,
            6 => FlacMetadataBlockType::Picture,
            127 => FlacMetadataBlockType::Invalid,
            other => FlacMetadataBlockType::Reserved(other),
        }
    }
}

/// FLAC metadata block header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlacMetadataBlockHeader {
    pub is_last: bool,
    pub block_type: FlacMetadataBlockType,
    pub length: u32,
}

impl FlacMetadataBlockHeader {
    pub const SIZE: usize = 4;

    pub fn parse(buffer: &[u8; Self::SIZE]) -> Self {
        FlacMetadataBlockHeader {
            is_last: (buffer[0] & 0x80) != 0,
            block_type: FlacMetadataBlockType::from_byte(buffer[0] & 0x7F),
            length: be_u24(&buffer[1..]),
        }
    }
}

/// STREAMINFO block contents
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub min_block_size: u16,
    pub max_block_size: u16,
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
    /// Zero when unknown
    pub total_samples: u64,
    pub md5: [u8; 16],
}

impl StreamInfo {
    pub const SIZE: usize = 34;

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::decode(format!(
                "FLAC STREAMINFO block too short: {} bytes",
                data.len()
            )));
        }

        // sample rate (20) | channels - 1 (3) | bits per sample - 1 (5) | total samples (36)
        let mut packed = [0u8; 8];
        packed.copy_from_slice(&data[10..18]);
        let packed = u64::from_be_bytes(packed);

        let mut md5 = [0u8; 16];
        md5.copy_from_slice(&data[18..34]);

        Ok(StreamInfo {
            min_block_size: u16::from_be_bytes([data[0], data[1]]),
            max_block_size: u16::from_be_bytes([data[2], data[3]]),
            sample_rate: (packed >> 44) as u32,
            channels: ((packed >> 41) & 0x7) as u32 + 1,
            bits_per_sample: ((packed >> 36) & 0x1F) as u32 + 1,
            total_samples: packed & 0xF_FFFF_FFFF,
            md5,
        })
    }

    /// Seconds, if both the sample rate and sample count are known
    pub fn duration(&self) -> Option<f64> {
        if self.sample_rate == 0 || self.total_samples == 0 {
            return None;
        }
        Some(self.total_samples as f64 / f64::from(self.sample_rate))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// STREAMINFO body for 44.1 kHz stereo 16-bit, `total_samples` samples
    pub(crate) fn stream_info_bytes(total_samples: u64) -> Vec<u8> {
        let mut data = vec![0x10, 0x00, 0x10, 0x00, 0, 0, 0, 0, 0, 0];
        let packed: u64 = (44100u64 << 44) | (1 << 41) | (15 << 36) | total_samples;
        data.extend_from_slice(&packed.to_be_bytes());
        data.extend_from_slice(&[0x5A; 16]);
        data
    }

    #[test]
    fn test_header_parse() {
        let header = FlacMetadataBlockHeader::parse(&[0x84, 0x00, 0x01, 0x02]);
        assert!(header.is_last);
        assert_eq!(header.block_type, FlacMetadataBlockType::VorbisComment);
        assert_eq!(header.length, 0x0102);
        assert_eq!(
            FlacMetadataBlockHeader::parse(&[0x09, 0, 0, 0]).block_type,
            FlacMetadataBlockType::Reserved(9)
        );
    }

    #[test]
    fn test_stream_info() {
        let info = StreamInfo::parse(&stream_info_bytes(441_000)).unwrap();
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 2);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.total_samples, 441_000);
        assert_eq!(info.md5, [0x5A; 16]);
        assert_eq!(info.duration(), Some(10.0));
    }

    #[test]
    fn test_stream_info_too_short() {
        assert!(StreamInfo::parse(&[0u8; 10]).is_err());
    }
}
