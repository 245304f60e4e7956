/// User Store
///
/// Users live in a `users` tree keyed by id, with a `users_email_idx` tree
/// mapping email to id. Registration claims the email key with a
/// compare-and-swap so two concurrent registrations of the same address
/// cannot both succeed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, StoreError, ValidationError};

const USERS_TREE: &str = "users";
const EMAIL_INDEX_TREE: &str = "users_email_idx";

/// Access level attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Moderator,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Member
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Moderator => write!(f, "moderator"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct UserStore {
    users: sled::Tree,
    email_index: sled::Tree,
}

impl UserStore {
    pub fn new(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            users: db.open_tree(USERS_TREE)?,
            email_index: db.open_tree(EMAIL_INDEX_TREE)?,
        })
    }

    /// Persist a new user.
    ///
    /// The record is written before the email index is claimed: an index
    /// entry must never point at a missing user, so the claim goes last and
    /// the record is removed again if the claim loses.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if the email is already registered.
    pub fn create(&self, user: &User) -> Result<(), AppError> {
        let bytes = serde_json::to_vec(user).map_err(StoreError::from)?;
        self.users
            .insert(user.id.as_bytes(), bytes)
            .map_err(StoreError::from)?;

        let claimed = match self.email_index.compare_and_swap(
            user.email.as_bytes(),
            None as Option<&[u8]>,
            Some(user.id.as_bytes().to_vec()),
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                let _ = self.users.remove(user.id.as_bytes());
                return Err(StoreError::from(e).into());
            }
        };
        if claimed.is_err() {
            self.users
                .remove(user.id.as_bytes())
                .map_err(StoreError::from)?;
            return Err(AppError::Conflict("Email already exists"));
        }

        self.users.flush().map_err(StoreError::from)?;
        Ok(())
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let id = match self.email_index.get(email.as_bytes())? {
            Some(id) => id,
            None => return Ok(None),
        };
        self.load(&id)
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.load(id.as_bytes())
    }

    fn load(&self, id_bytes: &[u8]) -> Result<Option<User>, StoreError> {
        match self.users.get(id_bytes)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, UserStore) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db = sled::open(dir.path()).expect("failed to open sled");
        let store = UserStore::new(&db).expect("failed to open trees");
        (dir, store)
    }

    fn sample_user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "$2b$12$fakehashfakehashfakehash".to_string(),
            role: Role::Member,
        }
    }

    #[test]
    fn created_user_is_found_by_email_and_id() {
        let (_dir, store) = open_store();
        let user = sample_user("a@x.com");

        store.create(&user).expect("create failed");

        let by_email = store.find_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.name, "Alice");
        assert_eq!(by_email.role, Role::Member);

        let by_id = store.find_by_id(user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (_dir, store) = open_store();
        store.create(&sample_user("a@x.com")).expect("create failed");

        let err = store.create(&sample_user("a@x.com")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn losing_duplicate_registration_leaves_no_record_behind() {
        let (_dir, store) = open_store();
        store.create(&sample_user("a@x.com")).expect("create failed");

        let loser = sample_user("a@x.com");
        let err = store.create(&loser).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(store.find_by_id(loser.id).unwrap().is_none());
    }

    #[test]
    fn user_record_round_trips_through_json() {
        let user = sample_user("a@x.com");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], user.id.to_string());
        assert_eq!(json["role"], "member");

        let parsed: User = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.id, user.id);
        assert_eq!(parsed.email, "a@x.com");
    }

    #[test]
    fn unknown_email_returns_none() {
        let (_dir, store) = open_store();
        assert!(store.find_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!("member".parse::<Role>().unwrap(), Role::Member);
        assert_eq!("moderator".parse::<Role>().unwrap(), Role::Moderator);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(role, Role::Moderator);
    }
}
