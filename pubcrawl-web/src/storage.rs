//! `localStorage` / `sessionStorage` adapters for the session store.
use pubcrawl_game::{KeyValueStore, StorageError};
use web_sys::Storage;

use crate::dom;

/// Which browser storage area backs a [`WebStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    /// Survives browser restarts.
    Local,
    /// Cleared when the tab closes.
    Session,
}

impl StorageScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "localStorage",
            Self::Session => "sessionStorage",
        }
    }
}

/// Key/value store over one of the browser storage areas.
///
/// The handle is looked up on every call. Private browsing modes may deny
/// access at any point, and the session store already treats a missing
/// scope as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebStorage {
    scope: StorageScope,
}

impl WebStorage {
    #[must_use]
    pub const fn local() -> Self {
        Self {
            scope: StorageScope::Local,
        }
    }

    #[must_use]
    pub const fn session() -> Self {
        Self {
            scope: StorageScope::Session,
        }
    }

    #[must_use]
    pub const fn scope(&self) -> StorageScope {
        self.scope
    }

    fn area(&self) -> Result<Storage, StorageError> {
        let win = dom::window().map_err(|err| StorageError::Unavailable(err.to_string()))?;
        let area = match self.scope {
            StorageScope::Local => win.local_storage(),
            StorageScope::Session => win.session_storage(),
        };
        area.map_err(|err| StorageError::Unavailable(dom::js_error_message(&err)))?
            .ok_or_else(|| StorageError::Unavailable(self.scope.as_str().to_string()))
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.area() {
            Ok(area) => area.get_item(key).ok().flatten(),
            Err(err) => {
                log::debug!("{} read skipped: {err}", self.scope.as_str());
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.area()?
            .set_item(key, value)
            .map_err(|err| StorageError::WriteRejected(dom::js_error_message(&err)))
    }

    fn remove(&self, key: &str) {
        let removed = self.area().and_then(|area| {
            area.remove_item(key)
                .map_err(|err| StorageError::WriteRejected(dom::js_error_message(&err)))
        });
        if let Err(err) = removed {
            log::debug!("{} remove skipped: {err}", self.scope.as_str());
        }
    }
}
