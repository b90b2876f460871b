//! `tabrag collections`: list stored collections.

use anyhow::Result;

use crate::config::Config;
use crate::store::FileStore;

pub fn run_collections(config: &Config) -> Result<()> {
    let store = FileStore::new(&config.store.dir);
    let collections = store.list_collections()?;

    if collections.is_empty() {
        println!("No collections in {}", store.dir().display());
        return Ok(());
    }

    println!(
        "{:<48} {:<28} {:>8} {:>8}",
        "FILE", "SOURCE", "ROWS", "SCORED"
    );
    for c in &collections {
        println!(
            "{:<48} {:<28} {:>8} {:>8}",
            c.file, c.source_file, c.total_rows, c.scorable_rows
        );
    }

    Ok(())
}
