// CLI command implementations
use super::output::OutputFormatter;
use anyhow::{bail, Context, Result};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tagweave::parser::SNIFF_LEN;
use tagweave::{parse_file, ParseOptions, ParserId};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Read metadata from files
pub async fn command_read(
    files: &[PathBuf],
    options: &ParseOptions,
    output: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<usize> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout()),
    };

    let mut failures = 0;
    for path in files {
        match parse_file(path, options).await {
            Ok(metadata) => formatter.output_metadata(path, &metadata, &mut *writer)?,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", path.display(), e));
                failures += 1;
            }
        }
    }
    writer.flush()?;
    Ok(failures)
}

/// Detect file format by extension, falling back to content
pub async fn command_detect(files: &[PathBuf], formatter: &OutputFormatter) -> Result<usize> {
    let mut failures = 0;
    for path in files {
        match detect(path).await {
            Ok(Some((id, how))) => println!("{}: {} (by {})", path.display(), id, how),
            Ok(None) => {
                formatter.print_error(&format!("{}: Unknown format", path.display()));
                failures += 1;
            }
            Err(e) => {
                formatter.print_error(&format!("{}: {:#}", path.display(), e));
                failures += 1;
            }
        }
    }
    Ok(failures)
}

async fn detect(path: &Path) -> Result<Option<(ParserId, &'static str)>> {
    if let Some(id) = ParserId::from_path(path) {
        return Ok(Some((id, "extension")));
    }

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head).await?;
    Ok(ParserId::sniff(&head).map(|id| (id, "content")))
}

/// Batch process directory
pub async fn command_batch(
    directory: &Path,
    pattern: &str,
    options: &ParseOptions,
    formatter: &OutputFormatter,
) -> Result<usize> {
    let files = find_files(directory, pattern, formatter)?;
    let total = files.len();
    if total == 0 {
        formatter.print_info("No files found matching pattern");
        return Ok(0);
    }
    formatter.print_info(&format!("Processing {} files...", total));

    let mut writer = std::io::stdout();
    let mut failures = 0;
    for path in &files {
        match parse_file(path, options).await {
            Ok(metadata) => formatter.output_metadata(path, &metadata, &mut writer)?,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", path.display(), e));
                failures += 1;
            }
        }
    }

    formatter.print_info(&format!(
        "Completed: {} successful, {} errors",
        total - failures,
        failures
    ));
    Ok(failures)
}

/// Files under `directory` matching `pattern`; a bare name is searched recursively
pub fn find_files(
    directory: &Path,
    pattern: &str,
    formatter: &OutputFormatter,
) -> Result<Vec<PathBuf>> {
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        directory.join(pattern)
    } else {
        directory.join("**").join(pattern)
    };
    let glob_pattern = glob_pattern.to_string_lossy();
    debug!(pattern = %glob_pattern, "searching");

    let mut files = Vec::new();
    for entry in glob::glob(&glob_pattern).context("Invalid glob pattern")? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }
    Ok(files)
}

/// Export cover art
pub async fn command_export_cover(
    file: &Path,
    output_dir: &Path,
    index: Option<usize>,
    formatter: &OutputFormatter,
) -> Result<usize> {
    let metadata = parse_file(file, &ParseOptions::new())
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let pictures = &metadata.common.picture;
    if pictures.is_empty() {
        bail!("{} has no embedded cover art", file.display());
    }

    let selected: Vec<usize> = match index {
        Some(i) if i < pictures.len() => vec![i],
        Some(i) => bail!("Cover index {} out of range ({} covers)", i, pictures.len()),
        None => (0..pictures.len()).collect(),
    };

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());

    for i in selected {
        let picture = &pictures[i];
        let target = output_dir.join(format!("{}-cover{}.{}", stem, i, picture.extension()));
        tokio::fs::write(&target, &picture.data)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;
        info!(path = %target.display(), bytes = picture.data.len(), "cover exported");
        formatter.print_success(&format!("Exported {}", target.display()));
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_find_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.flac"), b"").unwrap();
        std::fs::write(dir.path().join("b.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("sub").join("c.flac"), b"").unwrap();

        let formatter = OutputFormatter::new(OutputFormat::Json, true);
        let top = find_files(dir.path(), "*.flac", &formatter).unwrap();
        assert_eq!(top, vec![dir.path().join("a.flac")]);

        let nested = find_files(dir.path(), "c.flac", &formatter).unwrap();
        assert_eq!(nested, vec![dir.path().join("sub").join("c.flac")]);
    }

    #[tokio::test]
    async fn test_detect_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noext");
        std::fs::write(&path, b"fLaC\0\0\0\x22").unwrap();
        let detected = detect(&path).await.unwrap();
        assert_eq!(detected, Some((ParserId::Flac, "content")));

        let by_name = detect(Path::new("missing.mp3")).await.unwrap();
        assert_eq!(by_name, Some((ParserId::Mpeg, "extension")));
    }

    #[tokio::test]
    async fn test_export_cover_without_pictures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.mp3");
        std::fs::write(&path, [0xFF, 0xFB, 0x90, 0x64]).unwrap();
        let formatter = OutputFormatter::new(OutputFormat::Json, true);
        let err = command_export_cover(&path, dir.path(), None, &formatter)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no embedded cover art"));
    }
}
