//! Command-line interface for vaultflux.

/// Clap argument definitions
mod args;

/// Settings snapshot inspection
mod config;

/// Filesystem-backed storage implementations
mod fs;

/// Import command handler
mod import;

use clap::Parser;

use vaultflux_core::settings::ImportSettings;

pub use args::Cli;
use args::Commands;

/// Main entry point for the CLI
pub fn run_cli() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let success = match cli.command {
        Commands::Import {
            vault,
            dest,
            root_folder,
            combine,
            combine_with_subfolders,
            no_overwrite,
            ignore_duplicate,
            skip_assets,
            media_folder,
            player_observe,
            exclude_gm_only,
            index,
            no_backlinks,
            html,
        } => {
            let settings = ImportSettings {
                root_folder_name: root_folder,
                combine_notes: combine,
                combine_notes_no_subfolders: !combine_with_subfolders,
                overwrite: !no_overwrite,
                ignore_duplicate,
                import_non_markdown: !skip_assets,
                media_folder,
                player_observe,
                exclude_gm_only,
                create_index_file: index,
                create_backlinks: !no_backlinks,
                use_rich_text_conversion: html,
                ..ImportSettings::default()
            };
            import::handle_import(&vault, &dest, settings)
        }

        Commands::LastSettings => config::handle_last_settings(),
    };

    if !success {
        std::process::exit(1);
    }
}
