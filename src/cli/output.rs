// Output formatting for CLI

use super::config::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tagweave::{group_by_id, rating_to_stars, AudioMetadata, TagValue};

/// One file's result as written by `read` and `batch`
#[derive(Serialize)]
struct Report<'a> {
    file: &'a Path,
    #[serde(flatten)]
    metadata: &'a AudioMetadata,
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    pub quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output metadata
    pub fn output_metadata(
        &self,
        path: &Path,
        metadata: &AudioMetadata,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let report = Report { file: path, metadata };
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(&report)?)?;
            }
            OutputFormat::Table => {
                self.output_table(path, metadata, writer)?;
            }
        }
        Ok(())
    }

    /// Output as table
    fn output_table(
        &self,
        path: &Path,
        metadata: &AudioMetadata,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let rows = table_rows(metadata);
        let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

        writeln!(writer, "{}", path.display())?;
        writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        for (key, value) in rows {
            writeln!(writer, "{:<width$} {}", format!("{}:", key), value, width = max_key_len + 1)?;
        }
        writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}

/// Rows for table output: format, common tags, then native tags by type
pub fn table_rows(metadata: &AudioMetadata) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            rows.push((key.to_string(), value));
        }
    };

    let format = &metadata.format;
    push("container", format.container.clone());
    push("codec", format.codec.clone());
    push("duration", format.duration.map(|d| format!("{:.2}s", d)));
    push("bitrate", format.bitrate.map(|b| format!("{:.0} bps", b)));
    push("sample rate", format.sample_rate.map(|r| format!("{} Hz", r)));
    push("channels", format.number_of_channels.map(|c| c.to_string()));
    push("tag types", joined(format.tag_types.iter().map(|t| t.to_string())));

    let common = &metadata.common;
    push("title", common.title.clone());
    push("artist", common.artist.clone());
    push("album", common.album.clone());
    push("album artist", common.albumartist.clone());
    push("year", common.year.map(|y| y.to_string()));
    push("track", position(common.track.no, common.track.of));
    push("disk", position(common.disk.no, common.disk.of));
    push("genre", joined(common.genre.iter().cloned()));
    push(
        "rating",
        common.rating.first().map(|r| "★".repeat(usize::from(rating_to_stars(Some(r.rating))))),
    );
    push("pictures", (!common.picture.is_empty()).then(|| common.picture.len().to_string()));

    for (tag_type, tags) in metadata.native.iter() {
        for (id, values) in group_by_id(tags).iter() {
            let key = format!("{}:{}", tag_type, id);
            push(&key, joined(values.iter().map(display_value)));
        }
    }
    rows
}

fn position(no: Option<u32>, of: Option<u32>) -> Option<String> {
    match (no, of) {
        (Some(no), Some(of)) => Some(format!("{}/{}", no, of)),
        (Some(no), None) => Some(no.to_string()),
        (None, Some(of)) => Some(format!("?/{}", of)),
        (None, None) => None,
    }
}

fn joined(values: impl Iterator<Item = String>) -> Option<String> {
    let values: Vec<String> = values.collect();
    (!values.is_empty()).then(|| values.join("; "))
}

/// Format a tag value for display
fn display_value(value: &TagValue) -> String {
    match value {
        TagValue::Picture(picture) => format!("<{}, {} bytes>", picture.format, picture.data.len()),
        TagValue::Bytes(data) => format!("<{} bytes>", data.len()),
        TagValue::Rating(rating) => format!("{:.2}", rating.rating),
        TagValue::List(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        other => other.to_text().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagweave::{NativeTag, Picture, Rating, TagType};

    fn sample() -> AudioMetadata {
        let mut metadata = AudioMetadata::default();
        metadata.format.container = Some("FLAC".to_string());
        metadata.format.duration = Some(10.0);
        metadata.common.title = Some("Song".to_string());
        metadata.common.track.no = Some(3);
        metadata.common.track.of = Some(12);
        metadata.common.rating.push(Rating { source: None, rating: 0.5 });
        metadata.native.push(&TagType::Vorbis, NativeTag::new("ARTIST", "A"));
        metadata.native.push(&TagType::Vorbis, NativeTag::new("ARTIST", "B"));
        metadata.native.push(
            &TagType::Vorbis,
            NativeTag::new(
                "METADATA_BLOCK_PICTURE",
                Picture {
                    format: "image/png".to_string(),
                    data: vec![1, 2, 3],
                    description: None,
                    picture_type: None,
                },
            ),
        );
        metadata
    }

    fn row<'a>(rows: &'a [(String, String)], key: &str) -> Option<&'a str> {
        rows.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_table_rows() {
        let rows = table_rows(&sample());
        assert_eq!(row(&rows, "container"), Some("FLAC"));
        assert_eq!(row(&rows, "duration"), Some("10.00s"));
        assert_eq!(row(&rows, "track"), Some("3/12"));
        assert_eq!(row(&rows, "rating"), Some("★★★"));
        assert_eq!(row(&rows, "vorbis:ARTIST"), Some("A; B"));
        assert_eq!(row(&rows, "vorbis:METADATA_BLOCK_PICTURE"), Some("<image/png, 3 bytes>"));
        assert_eq!(row(&rows, "album"), None);
    }

    #[test]
    fn test_json_output_names_the_file() {
        let formatter = OutputFormatter::new(OutputFormat::Json, true);
        let mut out = Vec::new();
        formatter
            .output_metadata(Path::new("a.flac"), &sample(), &mut out)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["file"], "a.flac");
        assert_eq!(value["common"]["title"], "Song");
    }
}
