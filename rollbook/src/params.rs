//! Page-level parameters driven by filter inputs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rollbook_table::{QueryCache, SourceKey};
use serde_json::{Map, Value};
use tracing::debug;

/// Values a page's query reads, such as the selected year, month or week.
///
/// Clones share the same values. Use [`PageParams::hook`] as an input's
/// `on_change_extra` to update a value and refetch the table in one step.
#[derive(Debug, Clone, Default)]
pub struct PageParams {
    values: Arc<Mutex<Map<String, Value>>>,
}

impl PageParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a JSON object; other values give an empty set.
    pub fn with_defaults(defaults: Value) -> Self {
        let values = match defaults {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            values: Arc::new(Mutex::new(values)),
        }
    }

    fn values(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.values().insert(name.into(), value);
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.values().clone()
    }

    /// A change hook that stores the new value under `name`, then
    /// invalidates `key` so tables over it refetch.
    pub fn hook(
        &self,
        name: impl Into<String>,
        cache: QueryCache,
        key: SourceKey,
    ) -> impl Fn(&Value) + Send + Sync + 'static {
        let params = self.clone();
        let name = name.into();
        move |value: &Value| {
            debug!(param = %name, %value, "page parameter changed");
            params.set(name.clone(), value.clone());
            cache.invalidate(&key);
        }
    }
}
