use crate::error::Result;
use crate::settings::{settings_path, Settings};
use crate::store::Store;

pub fn run(settings: &Settings) -> Result<()> {
    let config = settings.store_config();
    let path = config.active_path();

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", settings.data_dir);
    println!("Backend:    {}", config.backend);
    println!("Store:      {}", path.display());

    if path.exists() {
        let store = Store::open(&config)?;
        println!();
        println!("Transactions:  {}", store.count()?);
    } else {
        println!();
        println!("Store not found. Run `cashbook init` or `cashbook add` to create it.");
    }
    Ok(())
}
