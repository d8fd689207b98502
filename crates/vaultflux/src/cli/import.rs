//! CLI handler for the import command.

use std::fs;
use std::path::Path;

use vaultflux_core::import::Importer;
use vaultflux_core::settings::ImportSettings;
use vaultflux_core::vault::{SourceContents, VaultSourceFile};

use super::fs::{FsDocumentStore, FsMediaStorage, FsSettingsStore};

/// Helper to run async operations in sync context
fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures_lite::future::block_on(f)
}

/// Handle the import command. Returns `true` on success.
pub fn handle_import(vault: &Path, dest: &Path, mut settings: ImportSettings) -> bool {
    let files = match collect_vault_files(vault) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("✗ Failed to read vault '{}': {}", vault.display(), e);
            return false;
        }
    };
    if files.is_empty() {
        eprintln!("✗ Vault '{}' contains no files", vault.display());
        return false;
    }
    let file_count = files.len();
    settings.vault_files = Some(files);

    let store = match FsDocumentStore::open(dest) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("✗ Failed to open destination '{}': {}", dest.display(), e);
            return false;
        }
    };
    let media = FsMediaStorage::new(dest);
    let settings_store = FsSettingsStore::new();

    let importer = Importer::new(&store, &media, &settings_store);
    match block_on(importer.run(&settings)) {
        Ok(()) => {
            println!(
                "✓ Imported {} files from '{}' into '{}'",
                file_count,
                vault.display(),
                dest.display()
            );
            true
        }
        Err(e) => {
            log::error!("import aborted: {e}");
            eprintln!("✗ Import failed: {e}");
            false
        }
    }
}

/// Walk the vault directory into source records. Paths are relative and
/// slash-delimited, rooted at the vault's own directory name.
fn collect_vault_files(vault: &Path) -> std::io::Result<Vec<VaultSourceFile>> {
    let vault_name = vault
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let pattern = format!("{}/**/*", vault.display());
    let paths = glob::glob(&pattern)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut files = Vec::new();
    for path in paths.flatten() {
        if !path.is_file() {
            continue;
        }
        let rel = path
            .strip_prefix(vault)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        files.push(VaultSourceFile {
            path: format!("{vault_name}/{rel}"),
            contents: SourceContents::Binary(fs::read(&path)?),
        });
    }
    Ok(files)
}
