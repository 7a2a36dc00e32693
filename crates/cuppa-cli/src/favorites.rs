//! Local favorites file commands.

use std::path::Path;

use clap::Subcommand;
use cuppa_core::FavoritesStore;

/// Sub-commands available under `favorites`. Ids are places-provider ids.
#[derive(Debug, Subcommand)]
pub enum FavoritesCommands {
    /// List saved shop ids
    List,
    /// Save a shop id
    Add { id: String },
    /// Forget a shop id
    Remove { id: String },
    /// Save the id if it is not saved, forget it otherwise
    Toggle { id: String },
}

/// Apply one favorites command to the file at `path`.
///
/// # Errors
///
/// Returns an error if the favorites file cannot be read or written.
pub(crate) fn run_favorites(path: &Path, command: FavoritesCommands) -> anyhow::Result<()> {
    let mut store = FavoritesStore::open(path)?;

    match command {
        FavoritesCommands::List => {
            if store.is_empty() {
                println!("no favorites saved in {}", path.display());
            }
            for id in store.list() {
                println!("{id}");
            }
        }
        FavoritesCommands::Add { id } => {
            if store.add(&id)? {
                println!("added {id}");
            } else {
                println!("{id} is already a favorite");
            }
        }
        FavoritesCommands::Remove { id } => {
            if store.remove(&id)? {
                println!("removed {id}");
            } else {
                println!("{id} was not a favorite");
            }
        }
        FavoritesCommands::Toggle { id } => {
            if store.toggle(&id)? {
                println!("added {id}");
            } else {
                println!("removed {id}");
            }
        }
    }

    Ok(())
}
