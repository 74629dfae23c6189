pub mod backend;
pub mod ledger;
pub mod memory;

pub use backend::{PruneStats, Result, StorageError, Store};
pub use ledger::{Ledger, LedgerAccount, LedgerError, MemoryLedger};
pub use memory::MemoryStore;
