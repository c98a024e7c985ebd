use anyhow::Context;
use taskpilot_engine::state::Credentials;

/// Where we store secrets in the OS keyring.
///
/// This is intentionally constant so upgrades don't orphan secrets.
const SERVICE: &str = "taskpilot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKey {
    ContentApiKey,
    BoardApiKey,
}

impl SecretKey {
    /// Fixed storage key, shared by every backend.
    pub fn storage_key(self) -> &'static str {
        match self {
            SecretKey::ContentApiKey => "geminiApiKey",
            SecretKey::BoardApiKey => "mondayApiKey",
        }
    }
}

/// Local key-value store for the two API keys.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: SecretKey) -> anyhow::Result<Option<String>>;
    fn set(&self, key: SecretKey, value: &str) -> anyhow::Result<()>;
    fn delete(&self, key: SecretKey) -> anyhow::Result<()>;
}

pub fn load_credentials(store: &dyn CredentialStore) -> anyhow::Result<Credentials> {
    Ok(Credentials {
        content_api_key: store.get(SecretKey::ContentApiKey)?.unwrap_or_default(),
        board_api_key: store.get(SecretKey::BoardApiKey)?.unwrap_or_default(),
    })
}

/// Blank values are removed rather than stored.
pub fn save_credentials(store: &dyn CredentialStore, creds: &Credentials) -> anyhow::Result<()> {
    for (key, value) in [
        (SecretKey::ContentApiKey, &creds.content_api_key),
        (SecretKey::BoardApiKey, &creds.board_api_key),
    ] {
        let value = value.trim();
        if value.is_empty() {
            store.delete(key)?;
        } else {
            store.set(key, value)?;
        }
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringCredentialStore;

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, key: SecretKey) -> anyhow::Result<Option<String>> {
        let entry =
            keyring::Entry::new(SERVICE, key.storage_key()).context("create keyring entry")?;

        match entry.get_password() {
            Ok(v) => Ok(Some(v)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)).context("get secret"),
        }
    }

    fn set(&self, key: SecretKey, value: &str) -> anyhow::Result<()> {
        let entry =
            keyring::Entry::new(SERVICE, key.storage_key()).context("create keyring entry")?;
        entry.set_password(value).context("set secret")
    }

    fn delete(&self, key: SecretKey) -> anyhow::Result<()> {
        let entry =
            keyring::Entry::new(SERVICE, key.storage_key()).context("create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)).context("delete secret"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<&'static str, String>>);

    impl CredentialStore for MemoryStore {
        fn get(&self, key: SecretKey) -> anyhow::Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key.storage_key()).cloned())
        }

        fn set(&self, key: SecretKey, value: &str) -> anyhow::Result<()> {
            self.0
                .lock()
                .unwrap()
                .insert(key.storage_key(), value.to_string());
            Ok(())
        }

        fn delete(&self, key: SecretKey) -> anyhow::Result<()> {
            self.0.lock().unwrap().remove(key.storage_key());
            Ok(())
        }
    }

    #[test]
    fn storage_keys_are_fixed() {
        // We don't want to touch developer's real keyring state in tests.
        assert_eq!(SecretKey::ContentApiKey.storage_key(), "geminiApiKey");
        assert_eq!(SecretKey::BoardApiKey.storage_key(), "mondayApiKey");
    }

    #[test]
    fn save_trims_and_drops_blank_keys() {
        let store = MemoryStore::default();
        store.set(SecretKey::BoardApiKey, "old").unwrap();

        save_credentials(
            &store,
            &Credentials {
                content_api_key: "  g-key ".into(),
                board_api_key: " ".into(),
            },
        )
        .unwrap();

        let loaded = load_credentials(&store).unwrap();
        assert_eq!(loaded.content_api_key, "g-key");
        assert_eq!(loaded.board_api_key, "");
    }
}
