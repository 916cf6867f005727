// CLI module for tagweave
//
// Command-line front end over the library entry points. Only the binary
// compiles this module.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config, OutputFormat};
pub use output::OutputFormatter;

use anyhow::Result;
use tagweave::ParseOptions;

/// Run the selected subcommand; returns the number of files that failed
pub async fn run(config: &Config) -> Result<usize> {
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Read {
            files,
            native,
            skip_covers,
            output,
        } => {
            let options = ParseOptions::new()
                .native(*native)
                .skip_covers(*skip_covers);
            commands::command_read(files, &options, output.as_deref(), &formatter).await
        }
        Commands::Detect { files } => commands::command_detect(files, &formatter).await,
        Commands::Batch {
            directory,
            pattern,
            native,
        } => {
            let options = ParseOptions::new().native(*native).skip_covers(true);
            commands::command_batch(directory, pattern, &options, &formatter).await
        }
        Commands::ExportCover {
            file,
            output,
            index,
        } => commands::command_export_cover(file, output, *index, &formatter).await,
    }
}
