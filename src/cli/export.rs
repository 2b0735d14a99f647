use std::path::PathBuf;

use crate::error::Result;
use crate::store::{Store, StoreConfig};
use crate::transfer::export_to_path;

pub fn run(config: &StoreConfig, out: &str) -> Result<()> {
    let store = Store::open(config)?;
    let path = PathBuf::from(out);
    let count = export_to_path(&store, &path)?;
    println!("Exported {count} transactions to {}", path.display());
    Ok(())
}
