// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tagweave - read audio metadata through one unified model
#[derive(Parser, Debug)]
#[command(name = "tagweave")]
#[command(about = "Read audio metadata through one unified model", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON, one document per line
    Json,
    /// Aligned key-value table
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read metadata from audio file(s)
    Read {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Include native tags
        #[arg(short, long)]
        native: bool,

        /// Do not decode embedded pictures
        #[arg(long)]
        skip_covers: bool,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect file format
    Detect {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Read every matching file in a directory
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: PathBuf,

        /// File pattern (e.g., "*.mp3", "*.flac")
        #[arg(short, long, default_value = "*")]
        pattern: String,

        /// Include native tags
        #[arg(short, long)]
        native: bool,
    },

    /// Export embedded cover art
    ExportCover {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output directory for cover images
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Cover index (for files with multiple covers); all covers if omitted
        #[arg(short, long)]
        index: Option<usize>,
    },
}

impl Config {
    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "tagweave=debug"
        } else if self.quiet {
            "tagweave=error"
        } else {
            "tagweave=warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read_command() {
        let config = Config::try_parse_from([
            "tagweave", "read", "a.flac", "b.mp3", "--native", "--skip-covers", "-f", "table",
        ])
        .unwrap();
        assert_eq!(config.format, OutputFormat::Table);
        match config.command {
            Commands::Read { files, native, skip_covers, output } => {
                assert_eq!(files.len(), 2);
                assert!(native && skip_covers);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_read_has_no_duration_flag() {
        // the built-in parsers take the duration from the stream header
        assert!(Config::try_parse_from(["tagweave", "read", "a.flac", "--duration"]).is_err());
    }

    #[test]
    fn test_batch_defaults() {
        let config = Config::try_parse_from(["tagweave", "batch", "-d", "/music"]).unwrap();
        match config.command {
            Commands::Batch { ref pattern, .. } => assert_eq!(pattern, "*"),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(config.log_filter(), "tagweave=warn");
    }

    #[test]
    fn test_verbose_wins_over_quiet() {
        let config = Config::try_parse_from(["tagweave", "-v", "-q", "detect", "x.flac"]).unwrap();
        assert_eq!(config.log_filter(), "tagweave=debug");
    }

    #[test]
    fn test_read_requires_files() {
        assert!(Config::try_parse_from(["tagweave", "read"]).is_err());
    }
}
