use crate::error::{CommandError, Result};
use crate::store::{ChannelTable, HashStore, ListStore, SetStore, StringStore};

/// Credential accepted by AUTH when none is configured.
pub const DEFAULT_PASSWORD: &str = "hunter2";

/// One session's worth of state: the auth gate plus every store.
///
/// Handlers receive it explicitly, so independent sessions never share data.
#[derive(Debug)]
pub struct Db {
    password: String,
    authenticated: bool,
    pub strings: StringStore,
    pub hashes: HashStore,
    pub sets: SetStore,
    pub lists: ListStore,
    pub channels: ChannelTable,
}

impl Db {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            authenticated: false,
            strings: StringStore::new(),
            hashes: HashStore::new(),
            sets: SetStore::new(),
            lists: ListStore::new(),
            channels: ChannelTable::new(),
        }
    }

    /// Compare against the configured credential. A mismatch revokes any
    /// earlier successful authentication.
    pub fn authenticate(&mut self, password: &str) -> bool {
        self.authenticated = password == self.password;
        self.authenticated
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn require_auth(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(CommandError::AuthRequired)
        }
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD)
    }
}
