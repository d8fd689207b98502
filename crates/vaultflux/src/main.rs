//! Command-line importer for markdown vaults.

/// CLI module - command-line interface for vaultflux
mod cli;

fn main() {
    cli::run_cli();
}
