//! Clap argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line importer for markdown vaults.
#[derive(Parser)]
#[command(name = "vaultflux", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a vault directory into a filesystem document store
    Import {
        /// Vault directory to import
        vault: PathBuf,

        /// Destination directory the store is materialized under
        #[arg(short, long, default_value = "vaultflux-out")]
        dest: PathBuf,

        /// Store folder the whole vault nests under (empty: store root)
        #[arg(long, default_value = "")]
        root_folder: String,

        /// Fold each leaf folder's notes into one combined entry
        #[arg(long)]
        combine: bool,

        /// With --combine, also combine folders that have subfolders
        #[arg(long, requires = "combine")]
        combine_with_subfolders: bool,

        /// Keep existing pages instead of updating them in place
        #[arg(long)]
        no_overwrite: bool,

        /// With --no-overwrite, skip files whose page already exists
        #[arg(long)]
        ignore_duplicate: bool,

        /// Skip non-markdown files entirely
        #[arg(long)]
        skip_assets: bool,

        /// Directory uploaded media lands in, relative to the destination
        #[arg(long, default_value = "img")]
        media_folder: String,

        /// Grant observer access to created entries
        #[arg(long)]
        player_observe: bool,

        /// Lock entries whose frontmatter flags them GM-only
        #[arg(long)]
        exclude_gm_only: bool,

        /// Render an aggregate index page after the import
        #[arg(long)]
        index: bool,

        /// Skip the backlink pass
        #[arg(long)]
        no_backlinks: bool,

        /// Convert every imported page to HTML as a final pass
        #[arg(long)]
        html: bool,
    },

    /// Show the settings snapshot saved by the previous import
    LastSettings,
}
