//! Storage handles
//!
//! Every component gets the stores it works with passed in at construction
//! time; nothing reaches for a global database handle. A backend is opened
//! once with [`open`], and closed by dropping the returned [`Stores`] (for
//! Postgres that drops the last reference to the connection pool).
pub mod postgres;

use crate::{directory, ledger, registry};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub use self::postgres::PostgresPersistence;

/// The stores the bidding engine works against, all opened on one backend
#[derive(Clone)]
pub struct Stores {
    pub ledger: ledger::SharedBidLedger,
    pub registry: registry::SharedAutoBidRegistry,
    pub directory: directory::SharedDirectory,
}

impl Stores {
    /// Fresh, empty in-memory stores
    ///
    /// Useful for unit-tests and for trying things out.
    pub fn in_memory() -> Self {
        Self {
            ledger: Arc::new(ledger::InMemoryBidLedger::new()),
            registry: Arc::new(registry::InMemoryAutoBidRegistry::new()),
            directory: Arc::new(directory::InMemoryDirectory::new()),
        }
    }

    pub fn postgres(persistence: &PostgresPersistence) -> Self {
        Self {
            ledger: Arc::new(ledger::PostgresBidLedger::new(persistence.clone())),
            registry: Arc::new(registry::PostgresAutoBidRegistry::new(
                persistence.clone(),
            )),
            directory: Arc::new(directory::PostgresDirectory::new(persistence.clone())),
        }
    }
}

/// Open the configured backend: Postgres if a url is given, memory otherwise
pub fn open(database_url: Option<&str>, pool_size: u32) -> Result<Stores> {
    Ok(match database_url {
        Some(url) => {
            let persistence = PostgresPersistence::connect(url, pool_size)?;
            info!(pool_size, "using postgres storage");
            Stores::postgres(&persistence)
        }
        None => {
            info!("using in-memory storage");
            Stores::in_memory()
        }
    })
}
