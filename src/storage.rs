use crate::errors::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

/// Namespaced key-value store of JSON records, the app's single shared
/// resource. Every mutation is a full read-modify-write under the state
/// mutex; last write wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    pub entries: BTreeMap<String, Value>,
}

impl Store {
    /// Read and parse the value under `key`. A missing key or malformed
    /// stored content yields the default; parse failures are logged and
    /// never propagated to the caller.
    pub fn get<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.entries.get(key) {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(parsed) => parsed,
                Err(err) => {
                    error!("malformed value under {key}: {err}");
                    T::default()
                }
            },
            None => T::default(),
        }
    }

    /// Serialize `value` and overwrite whatever is under `key`.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: &T) {
        match serde_json::to_value(value) {
            Ok(serialized) => {
                self.entries.insert(key.into(), serialized);
            }
            Err(err) => error!("failed to serialize value for store: {err}"),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_store(path: &Path) -> Store {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(store) => store,
            Err(err) => {
                error!("failed to parse data file: {err}");
                Store::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Store::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Store::default()
        }
    }
}

pub async fn persist_store(path: &Path, store: &Store) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightEntry;

    #[test]
    fn get_missing_key_yields_default() {
        let store = Store::default();
        let entries: Vec<WeightEntry> = store.get("weights_demo_athlete_1");
        assert!(entries.is_empty());
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut store = Store::default();
        let entry = WeightEntry {
            weight: 68.5,
            time: "בוקר".to_string(),
            notes: Some("לפני אימון".to_string()),
            timestamp: "2026-08-06T07:30:00Z".to_string(),
            date: "2026-08-06".to_string(),
            source: None,
        };
        store.set("weights_demo_athlete_1", &vec![entry]);

        let loaded: Vec<WeightEntry> = store.get("weights_demo_athlete_1");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].weight, 68.5);
        assert_eq!(loaded[0].date, "2026-08-06");
    }

    #[test]
    fn malformed_value_falls_back_to_default() {
        let mut store = Store::default();
        store
            .entries
            .insert("weights_demo_athlete_1".to_string(), Value::from("not a list"));

        let entries: Vec<WeightEntry> = store.get("weights_demo_athlete_1");
        assert!(entries.is_empty());
    }

    #[test]
    fn keys_with_prefix_lists_outbox() {
        let mut store = Store::default();
        store.set("to_nutritionist_1754000000000", &serde_json::json!({}));
        store.set("to_nutritionist_1754000001000", &serde_json::json!({}));
        store.set("weights_demo_athlete_1", &serde_json::json!([]));

        let keys = store.keys_with_prefix("to_nutritionist_");
        assert_eq!(keys.len(), 2);
    }
}
