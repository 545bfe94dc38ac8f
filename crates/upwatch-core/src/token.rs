// ── Token persistence seam ──
//
// The dashboard never decides where a session token lives. Interactive
// front ends persist it (keyring / file, see `upwatch-config`); one-shot
// invocations with `--token` keep it in memory.

use std::sync::{Mutex, PoisonError};

use upwatch_api::AuthToken;

use crate::error::CoreError;

/// Load/save/clear for the current session token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<AuthToken>, CoreError>;
    fn save(&self, token: &AuthToken) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<AuthToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, CoreError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &AuthToken) -> Result<(), CoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&AuthToken::new("abc")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().expose(), "abc");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
