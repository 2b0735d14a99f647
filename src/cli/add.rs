use crate::error::Result;
use crate::prompt::{self, Draft, Terminal};
use crate::store::{ConflictPolicy, PutOutcome, Store, StoreConfig};

pub fn run(config: &StoreConfig, draft: Draft) -> Result<()> {
    let txn = if draft.is_complete() {
        draft.into_transaction()?
    } else {
        prompt::collect(&mut Terminal, draft)?
    };
    let store = Store::open(config)?;
    match store.put(&txn, ConflictPolicy::Replace)? {
        PutOutcome::Replaced => println!("Saved transaction {} (replaced existing record)", txn.id),
        _ => println!("Saved transaction {}", txn.id),
    }
    Ok(())
}
