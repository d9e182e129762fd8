pub mod storage;

use serde::{Deserialize, Serialize};
use tower_cookies::Key;

pub use storage::{CookieStorage, MemoryStorage, SessionStorage};

/// Storage key holding the serialized identity.
pub const SESSION_KEY: &str = "aero_user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Guest,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Guest => "guest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

/// The two built-in accounts. Plain-text comparison, no lockout.
pub fn authenticate(username: &str, password: &str) -> Option<Role> {
    match (username, password) {
        ("admin", "admin123") => Some(Role::Admin),
        ("guest", "guest123") => Some(Role::Guest),
        _ => None,
    }
}

/// Key signing the session cookie. Without a usable secret a random key is
/// generated and sessions end when the process restarts.
pub fn session_key(secret: Option<&str>) -> Key {
    match secret.map(|secret| Key::try_from(secret.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(e)) => {
            log::warn!("Unusable SESSION_SECRET ({}); using a random key", e);
            Key::generate()
        }
        None => {
            log::warn!("SESSION_SECRET is not set; sessions end when the server restarts");
            Key::generate()
        }
    }
}

/// The current user, mirrored into a [`SessionStorage`] under [`SESSION_KEY`].
pub struct Session<S: SessionStorage> {
    storage: S,
    current: Option<Identity>,
}

impl<S: SessionStorage> Session<S> {
    /// Rehydrates from storage. Unreadable content is dropped.
    pub fn restore(storage: S) -> Self {
        let current = match storage.get(SESSION_KEY) {
            Some(raw) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    log::warn!("Discarding unreadable session: {}", e);
                    storage.remove(SESSION_KEY);
                    None
                }
            },
            None => None,
        };

        Self { storage, current }
    }

    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    pub fn login(&mut self, username: &str, password: &str) -> bool {
        let Some(role) = authenticate(username, password) else {
            log::info!("Rejected login for '{}'", username);
            return false;
        };

        let identity = Identity {
            username: username.to_string(),
            role,
        };
        match serde_json::to_string(&identity) {
            Ok(raw) => self.storage.set(SESSION_KEY, raw),
            Err(e) => {
                log::error!("Failed to serialize session: {}", e);
                return false;
            }
        }

        log::info!("'{}' signed in as {}", username, role.as_str());
        self.current = Some(identity);
        true
    }

    pub fn logout(&mut self) {
        if let Some(identity) = self.current.take() {
            log::info!("'{}' signed out", identity.username);
        }
        self.storage.remove(SESSION_KEY);
    }
}
