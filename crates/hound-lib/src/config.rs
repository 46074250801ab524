//! Persistent per-user configuration.
//!
//! One YAML document at `<config dir>/houndify-cli/houndify-cli.yaml`. The
//! document is kept as a raw mapping so keys this tool does not know about
//! survive a load/save cycle. Key lookups ignore ASCII case; older versions
//! of the tool wrote lowercased keys.
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `User` | `$USER` or `hound-<random>` | user id sent to the provider |
//! | `Units` | `metric` | `metric` or `imperial` |
//! | `ClientId` / `ClientKey` | — | provider credentials |
//! | `IpstackAccessKey` | — | geolocation service key |
//! | `Geolocate` | `false` | look up location before each query |
//! | `SendUnits` | `true` | send the unit preference with each query |

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use hound_core::identity::resolve_user_id;
use hound_core::types::{Features, UnitPreference};

use crate::error::{HoundError, Result};

pub const KEY_USER: &str = "User";
pub const KEY_UNITS: &str = "Units";
pub const KEY_CLIENT_ID: &str = "ClientId";
pub const KEY_CLIENT_KEY: &str = "ClientKey";
pub const KEY_IPSTACK_ACCESS_KEY: &str = "IpstackAccessKey";
pub const KEY_GEOLOCATE: &str = "Geolocate";
pub const KEY_SEND_UNITS: &str = "SendUnits";

/// Overrides the config file location.
pub const ENV_CONFIG: &str = "HOUND_CONFIG";
pub const ENV_CLIENT_ID: &str = "HOUNDIFY_CLIENT_ID";
pub const ENV_CLIENT_KEY: &str = "HOUNDIFY_CLIENT_KEY";
pub const ENV_IPSTACK_ACCESS_KEY: &str = "IPSTACK_ACCESS_KEY";

/// Default config file path for `app_name` under the platform config dir.
pub fn default_config_path(app_name: &str) -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", app_name)
        .ok_or_else(|| HoundError::Config("could not determine a home directory".into()))?;
    Ok(dirs.config_dir().join(format!("{app_name}.yaml")))
}

/// Current OS user name, if the environment provides a non-empty one.
pub fn env_user() -> Option<String> {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|v| !v.is_empty())
}

/// Provider credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_key: String,
}

/// Loaded configuration record plus the path it came from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    doc: Mapping,
}

impl ConfigStore {
    /// Load from `$HOUND_CONFIG` or the default per-user path.
    pub fn load(app_name: &str) -> Result<Self> {
        let path = match env::var_os(ENV_CONFIG) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => default_config_path(app_name)?,
        };
        Self::load_from(path, env_user().as_deref())
    }

    /// Load from an explicit path, creating it with defaults on first run.
    ///
    /// `env_user` seeds `User` when the file has none.
    pub fn load_from(path: impl Into<PathBuf>, env_user: Option<&str>) -> Result<Self> {
        let path = path.into();
        let first_run = !path.exists();

        let doc = if first_run {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).map_err(|source| HoundError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            Mapping::new()
        } else {
            read_mapping(&path)?
        };

        let mut store = Self { path, doc };
        store.apply_defaults(env_user);

        if first_run {
            store.save()?;
            info!(path = %store.path.display(), "created config file");
        } else {
            debug!(path = %store.path.display(), "loaded config file");
        }

        Ok(store)
    }

    fn apply_defaults(&mut self, env_user: Option<&str>) {
        if self.get(KEY_USER).is_none_or(Value::is_null) {
            self.set(KEY_USER, resolve_user_id(env_user));
        }
        if self.get(KEY_UNITS).is_none_or(Value::is_null) {
            self.set(KEY_UNITS, UnitPreference::default().as_str());
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a key, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc
            .iter()
            .find(|(k, _)| k.as_str().is_some_and(|k| k.eq_ignore_ascii_case(key)))
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Booleans may be written as YAML booleans or as `"true"`/`"false"`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Set a key in memory. Every other spelling of the key that differs only
    /// in case is dropped. Nothing is written until [`ConfigStore::save`].
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.doc = std::mem::take(&mut self.doc)
            .into_iter()
            .filter(|(k, _)| !k.as_str().is_some_and(|k| k != key && k.eq_ignore_ascii_case(key)))
            .collect();
        self.doc.insert(Value::from(key), value.into());
    }

    /// Write the record back to its file, overwriting it.
    pub fn save(&self) -> Result<()> {
        let text = serde_yaml::to_string(&self.doc).map_err(|source| HoundError::Yaml {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| HoundError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "saved config file");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Typed accessors
    // -----------------------------------------------------------------------

    pub fn user(&self) -> Result<String> {
        match self.get(KEY_USER) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            other => Err(HoundError::Config(format!(
                "User in {} must be a non-empty string, got {other:?}",
                self.path.display()
            ))),
        }
    }

    /// The stored unit system. Anything but `metric`/`imperial` is an error.
    pub fn units(&self) -> Result<UnitPreference> {
        let raw = match self.get(KEY_UNITS) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => format!("{other:?}"),
            None => return Ok(UnitPreference::default()),
        };
        raw.parse().map_err(|source| HoundError::InvalidUnits {
            path: self.path.clone(),
            source,
        })
    }

    pub fn set_units(&mut self, units: UnitPreference) {
        self.set(KEY_UNITS, units.as_str());
    }

    /// Feature toggles stored in config.
    pub fn features(&self) -> Features {
        let defaults = Features::default();
        Features {
            units: self.get_bool(KEY_SEND_UNITS).unwrap_or(defaults.units),
            geolocation: self.get_bool(KEY_GEOLOCATE).unwrap_or(defaults.geolocation),
        }
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    /// Provider credentials from the process environment or config.
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_from(|name| env::var(name).ok())
    }

    /// Provider credentials, with the environment supplied by `lookup_env`.
    pub fn credentials_from(&self, lookup_env: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        Ok(Credentials {
            client_id: self.secret(&lookup_env, ENV_CLIENT_ID, KEY_CLIENT_ID)?,
            client_key: self.secret(&lookup_env, ENV_CLIENT_KEY, KEY_CLIENT_KEY)?,
        })
    }

    /// Geolocation service key from the process environment or config.
    pub fn ipstack_access_key(&self) -> Result<String> {
        self.ipstack_access_key_from(|name| env::var(name).ok())
    }

    pub fn ipstack_access_key_from(&self, lookup_env: impl Fn(&str) -> Option<String>) -> Result<String> {
        self.secret(&lookup_env, ENV_IPSTACK_ACCESS_KEY, KEY_IPSTACK_ACCESS_KEY)
    }

    fn secret(
        &self,
        lookup_env: &impl Fn(&str) -> Option<String>,
        env: &'static str,
        key: &'static str,
    ) -> Result<String> {
        lookup_env(env)
            .filter(|v| !v.is_empty())
            .or_else(|| self.get_str(key).filter(|v| !v.is_empty()).map(str::to_string))
            .ok_or_else(|| HoundError::MissingCredential {
                env,
                key,
                path: self.path.clone(),
            })
    }
}

fn read_mapping(path: &Path) -> Result<Mapping> {
    let text = fs::read_to_string(path).map_err(|source| HoundError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&text).map_err(|source| HoundError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        other => Err(HoundError::Config(format!(
            "{} must contain a key/value mapping, found {other:?}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_path(dir: &TempDir) -> PathBuf {
        dir.path().join("houndify-cli").join("houndify-cli.yaml")
    }

    #[test]
    fn first_load_creates_file_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let store = ConfigStore::load_from(&path, Some("alice")).unwrap();
        assert!(path.is_file());
        assert_eq!(store.user().unwrap(), "alice");
        assert_eq!(store.units().unwrap(), UnitPreference::Metric);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("User: alice"), "{text}");
        assert!(text.contains("Units: metric"), "{text}");
    }

    #[test]
    fn first_load_without_env_user_generates_one() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::load_from(config_path(&dir), None).unwrap();
        assert!(store.user().unwrap().starts_with("hound-"));
    }

    #[test]
    fn second_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let first = ConfigStore::load_from(&path, None).unwrap();
        let second = ConfigStore::load_from(&path, None).unwrap();
        assert_eq!(first.user().unwrap(), second.user().unwrap());
        assert_eq!(first.units().unwrap(), second.units().unwrap());
        assert_eq!(first.doc, second.doc);
    }

    #[test]
    fn units_survive_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let mut store = ConfigStore::load_from(&path, Some("alice")).unwrap();
        store.set_units(UnitPreference::Imperial);
        store.save().unwrap();

        let reloaded = ConfigStore::load_from(&path, Some("bob")).unwrap();
        assert_eq!(reloaded.units().unwrap(), UnitPreference::Imperial);
        assert_eq!(reloaded.user().unwrap(), "alice");
    }

    #[test]
    fn set_does_not_persist_until_save() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let mut store = ConfigStore::load_from(&path, Some("alice")).unwrap();
        store.set(KEY_UNITS, "imperial");

        let reloaded = ConfigStore::load_from(&path, Some("alice")).unwrap();
        assert_eq!(reloaded.units().unwrap(), UnitPreference::Metric);
    }

    #[test]
    fn empty_existing_file_gets_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "").unwrap();

        let store = ConfigStore::load_from(&path, Some("carol")).unwrap();
        assert_eq!(store.user().unwrap(), "carol");
        assert_eq!(store.units().unwrap(), UnitPreference::Metric);
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "User: [unclosed\n").unwrap();

        let err = ConfigStore::load_from(&path, Some("alice")).unwrap_err();
        assert!(matches!(err, HoundError::Yaml { .. }), "{err:?}");
    }

    #[test]
    fn non_mapping_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "- just\n- a list\n").unwrap();

        let err = ConfigStore::load_from(&path, Some("alice")).unwrap_err();
        assert!(matches!(err, HoundError::Config(_)), "{err:?}");
    }

    #[test]
    fn invalid_units_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "User: alice\nUnits: furlongs\n").unwrap();

        let store = ConfigStore::load_from(&path, None).unwrap();
        let err = store.units().unwrap_err();
        assert!(matches!(err, HoundError::InvalidUnits { .. }));
        assert!(err.to_string().contains("furlongs"));
    }

    #[test]
    fn lowercase_keys_are_honoured_and_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "user: dave\nunits: imperial\n").unwrap();

        let mut store = ConfigStore::load_from(&path, Some("alice")).unwrap();
        assert_eq!(store.user().unwrap(), "dave");
        assert_eq!(store.units().unwrap(), UnitPreference::Imperial);

        store.set_units(UnitPreference::Metric);
        store.save().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Units: metric"), "{text}");
        assert!(!text.contains("units: imperial"), "{text}");
    }

    #[test]
    fn set_drops_every_other_spelling() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "units: imperial\nUnits: imperial\nUser: a\n").unwrap();

        let mut store = ConfigStore::load_from(&path, None).unwrap();
        store.set_units(UnitPreference::Metric);
        assert_eq!(store.units().unwrap(), UnitPreference::Metric);

        store.save().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("imperial"), "{text}");

        let reloaded = ConfigStore::load_from(&path, None).unwrap();
        assert_eq!(reloaded.units().unwrap(), UnitPreference::Metric);
    }

    #[test]
    fn non_string_units_name_the_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "User: alice\nUnits: 42\n").unwrap();

        let store = ConfigStore::load_from(&path, None).unwrap();
        let err = store.units().unwrap_err();
        assert!(matches!(err, HoundError::InvalidUnits { .. }));
        assert!(err.to_string().contains("42"), "{err}");
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "User: alice\nUnits: metric\nState: keep-me\n").unwrap();

        let mut store = ConfigStore::load_from(&path, None).unwrap();
        store.set_units(UnitPreference::Imperial);
        store.save().unwrap();

        let reloaded = ConfigStore::load_from(&path, None).unwrap();
        assert_eq!(reloaded.get_str("State"), Some("keep-me"));
    }

    #[test]
    fn features_from_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "Geolocate: true\nSendUnits: \"false\"\n").unwrap();

        let store = ConfigStore::load_from(&path, Some("alice")).unwrap();
        let f = store.features();
        assert!(f.geolocation);
        assert!(!f.units);
    }

    #[test]
    fn credentials_prefer_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hound.yaml");
        fs::write(&path, "ClientId: from-file\nClientKey: file-key\n").unwrap();
        let store = ConfigStore::load_from(&path, Some("alice")).unwrap();

        let creds = store
            .credentials_from(|name| (name == ENV_CLIENT_ID).then(|| "from-env".to_string()))
            .unwrap();
        assert_eq!(creds.client_id, "from-env");
        assert_eq!(creds.client_key, "file-key");
    }

    #[test]
    fn missing_credentials_name_env_and_key() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::load_from(config_path(&dir), Some("alice")).unwrap();

        let err = store.credentials_from(|_| None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(ENV_CLIENT_ID) && msg.contains(KEY_CLIENT_ID), "{msg}");

        let err = store.ipstack_access_key_from(|_| Some(String::new())).unwrap_err();
        assert!(err.to_string().contains(ENV_IPSTACK_ACCESS_KEY));
    }
}
