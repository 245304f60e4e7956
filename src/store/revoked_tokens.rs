/// Revocation Ledger
///
/// Access tokens cannot be recalled once signed, so logout records them
/// here and the gate consults this ledger before any signature check.
/// Entries carry the token's own expiry so a sweeper can discard them
/// once the signature check alone would reject the token anyway.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

const REVOKED_TOKENS_TREE: &str = "revoked_tokens";

#[derive(Debug, Serialize, Deserialize)]
struct RevokedRecord {
    user_id: Uuid,
    expires_at: i64,
}

#[derive(Clone)]
pub struct RevocationLedger {
    tree: sled::Tree,
}

impl RevocationLedger {
    pub fn new(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            tree: db.open_tree(REVOKED_TOKENS_TREE)?,
        })
    }

    pub fn revoke(&self, token: &str, user_id: Uuid, expires_at: i64) -> Result<(), StoreError> {
        let record = RevokedRecord {
            user_id,
            expires_at,
        };
        self.tree
            .insert(token.as_bytes(), serde_json::to_vec(&record)?)?;
        self.tree.flush()?;
        Ok(())
    }

    pub fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.tree.contains_key(token.as_bytes())?)
    }

    /// Drop entries whose token has expired on its own. Returns how many
    /// were removed.
    pub fn prune_expired(&self, now: i64) -> Result<u64, StoreError> {
        let mut removed = 0;
        for entry in self.tree.iter() {
            let (key, value) = entry?;
            let record: RevokedRecord = serde_json::from_slice(&value)?;
            if record.expires_at <= now {
                self.tree.remove(key)?;
                removed += 1;
            }
        }
        self.tree.flush()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_ledger() -> (tempfile::TempDir, RevocationLedger) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db = sled::open(dir.path()).expect("failed to open sled");
        let ledger = RevocationLedger::new(&db).expect("failed to open tree");
        (dir, ledger)
    }

    #[test]
    fn revoked_token_is_reported_revoked() {
        let (_dir, ledger) = open_ledger();

        assert!(!ledger.is_revoked("token-a").unwrap());
        ledger.revoke("token-a", Uuid::new_v4(), 4_102_444_800).unwrap();
        assert!(ledger.is_revoked("token-a").unwrap());
    }

    #[test]
    fn prune_removes_only_expired_entries() {
        let (_dir, ledger) = open_ledger();
        let user_id = Uuid::new_v4();
        let now = chrono::Utc::now().timestamp();
        ledger.revoke("stale", user_id, now - 10).unwrap();
        ledger.revoke("live", user_id, now + 600).unwrap();

        let removed = ledger.prune_expired(now).unwrap();

        assert_eq!(removed, 1);
        assert!(!ledger.is_revoked("stale").unwrap());
        assert!(ledger.is_revoked("live").unwrap());
    }
}
