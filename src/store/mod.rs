/// Persistence Layer
///
/// Everything lives in a single embedded sled database with one tree per
/// concern. `Stores` bundles cheap-to-clone handles so startup can hand
/// each piece to the routes and middleware that need it.

pub mod refresh_tokens;
pub mod revoked_tokens;
pub mod users;

pub use refresh_tokens::{RefreshRecord, RefreshTokenLedger};
pub use revoked_tokens::RevocationLedger;
pub use users::{Role, User, UserStore};

use crate::error::StoreError;

#[derive(Clone)]
pub struct Stores {
    db: sled::Db,
    pub users: UserStore,
    pub refresh_tokens: RefreshTokenLedger,
    pub revoked_tokens: RevocationLedger,
}

impl Stores {
    pub fn open(data_dir: &str) -> Result<Self, StoreError> {
        let db = sled::open(data_dir)?;
        let users = UserStore::new(&db)?;
        let refresh_tokens = RefreshTokenLedger::new(&db)?;
        let revoked_tokens = RevocationLedger::new(&db)?;
        Ok(Self {
            db,
            users,
            refresh_tokens,
            revoked_tokens,
        })
    }

    /// Block until all pending writes hit disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}
