/// Refresh Token Ledger
///
/// One record per outstanding refresh token, keyed by the token string.
/// Rotation and logout both go through `consume`, whose underlying
/// `Tree::remove` returns the old value: when two requests race on the
/// same token, exactly one sees the record and the other gets `None`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

const REFRESH_TOKENS_TREE: &str = "refresh_tokens";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRecord {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Clone)]
pub struct RefreshTokenLedger {
    tree: sled::Tree,
}

impl RefreshTokenLedger {
    pub fn new(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            tree: db.open_tree(REFRESH_TOKENS_TREE)?,
        })
    }

    pub fn insert(&self, token: &str, user_id: Uuid) -> Result<RefreshRecord, StoreError> {
        let record = RefreshRecord {
            id: Uuid::new_v4(),
            user_id,
        };
        self.tree
            .insert(token.as_bytes(), serde_json::to_vec(&record)?)?;
        self.tree.flush()?;
        Ok(record)
    }

    pub fn find(&self, token: &str) -> Result<Option<RefreshRecord>, StoreError> {
        match self.tree.get(token.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove the record and return it, or `None` if it was already gone.
    pub fn consume(&self, token: &str) -> Result<Option<RefreshRecord>, StoreError> {
        let old = self.tree.remove(token.as_bytes())?;
        self.tree.flush()?;
        match old {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Drop every outstanding token for a user. Returns how many were removed.
    pub fn remove_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut removed = 0;
        for entry in self.tree.iter() {
            let (key, value) = entry?;
            let record: RefreshRecord = serde_json::from_slice(&value)?;
            if record.user_id == user_id {
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

    fn open_ledger() -> (tempfile::TempDir, RefreshTokenLedger) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db = sled::open(dir.path()).expect("failed to open sled");
        let ledger = RefreshTokenLedger::new(&db).expect("failed to open tree");
        (dir, ledger)
    }

    #[test]
    fn inserted_token_is_found() {
        let (_dir, ledger) = open_ledger();
        let user_id = Uuid::new_v4();

        let record = ledger.insert("token-a", user_id).unwrap();
        let found = ledger.find("token-a").unwrap().unwrap();

        assert_eq!(found, record);
        assert_eq!(found.user_id, user_id);
    }

    #[test]
    fn consume_returns_the_record_exactly_once() {
        let (_dir, ledger) = open_ledger();
        let user_id = Uuid::new_v4();
        ledger.insert("token-a", user_id).unwrap();

        let first = ledger.consume("token-a").unwrap();
        let second = ledger.consume("token-a").unwrap();

        assert_eq!(first.map(|r| r.user_id), Some(user_id));
        assert!(second.is_none());
        assert!(ledger.find("token-a").unwrap().is_none());
    }

    #[test]
    fn remove_all_for_user_leaves_other_users_alone() {
        let (_dir, ledger) = open_ledger();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        ledger.insert("alice-1", alice).unwrap();
        ledger.insert("alice-2", alice).unwrap();
        ledger.insert("bob-1", bob).unwrap();

        let removed = ledger.remove_all_for_user(alice).unwrap();

        assert_eq!(removed, 2);
        assert!(ledger.find("alice-1").unwrap().is_none());
        assert!(ledger.find("alice-2").unwrap().is_none());
        assert!(ledger.find("bob-1").unwrap().is_some());
    }
}
