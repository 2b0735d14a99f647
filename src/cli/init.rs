use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{save_settings, Settings};
use crate::store::Store;

pub fn run(settings: &Settings) -> Result<()> {
    save_settings(settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;

    let store = Store::open(&settings.store_config())?;
    println!(
        "Initialized cashbook at {} ({} backend, {})",
        resolved.display(),
        store.backend(),
        store.location().display()
    );
    Ok(())
}
