use tracing::warn;

use crate::models::{TokenPair, User};
use crate::storage::{
    StorageError, TokenStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY,
};

/// What storage held at startup.
#[derive(Debug, PartialEq)]
pub(crate) enum Persisted {
    Nothing,
    /// Only one of the two tokens survived.
    Partial,
    Tokens {
        tokens: TokenPair,
        user: Option<User>,
    },
}

pub(crate) fn load(storage: &dyn TokenStorage) -> Result<Persisted, StorageError> {
    let access = storage.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty());
    let refresh = storage.get(REFRESH_TOKEN_KEY)?.filter(|t| !t.is_empty());

    let tokens = match (access, refresh) {
        (Some(access), Some(refresh)) => TokenPair { access, refresh },
        (None, None) => return Ok(Persisted::Nothing),
        _ => return Ok(Persisted::Partial),
    };

    // An unreadable user record is not fatal; the profile is refetched anyway.
    let user = match storage.get(USER_KEY)? {
        Some(raw) => serde_json::from_str::<User>(&raw)
            .map_err(|e| warn!("Ignoring unreadable persisted user: {}", e))
            .ok(),
        None => None,
    };

    Ok(Persisted::Tokens { tokens, user })
}

pub(crate) fn save(
    storage: &dyn TokenStorage,
    tokens: &TokenPair,
    user: &User,
) -> Result<(), StorageError> {
    storage.set(ACCESS_TOKEN_KEY, &tokens.access)?;
    storage.set(REFRESH_TOKEN_KEY, &tokens.refresh)?;
    save_user(storage, user)
}

pub(crate) fn save_user(storage: &dyn TokenStorage, user: &User) -> Result<(), StorageError> {
    let raw = serde_json::to_string(user).map_err(|source| StorageError::Encode {
        key: USER_KEY.to_string(),
        source,
    })?;
    storage.set(USER_KEY, &raw)
}

pub(crate) fn save_access(storage: &dyn TokenStorage, access: &str) -> Result<(), StorageError> {
    storage.set(ACCESS_TOKEN_KEY, access)
}

/// Removes every session key, continuing past failures. Returns how many
/// removals failed.
pub(crate) fn clear(storage: &dyn TokenStorage) -> usize {
    SESSION_KEYS
        .iter()
        .filter(|key| match storage.remove(key) {
            Ok(()) => false,
            Err(e) => {
                warn!("Failed to remove persisted '{}': {}", key, e);
                true
            }
        })
        .count()
}
