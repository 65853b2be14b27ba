//! Trading Context
//!
//! Scoped configuration registry: a process-wide stack of configuration
//! scopes. Components constructed while a scope is active resolve their
//! category's slice of it exactly once, at construction time.

mod component;

pub use component::{Component, ResolvedConfig};

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{Result, TradeframeError};

/// Reserved top-level key whose entries are visible to every category
pub const SHARED_KEY: &str = "shared";

/// Flat key/value slice of a configuration scope
pub type ConfigMap = HashMap<String, Value>;

/// One entry on the context stack. Immutable once pushed.
#[derive(Debug, Clone, Default)]
pub struct ConfigScope {
    categories: HashMap<String, ConfigMap>,
    shared: ConfigMap,
}

impl ConfigScope {
    /// Split a raw config mapping into per-category maps and the shared map.
    ///
    /// Top-level object values become category configs. The reserved
    /// `"shared"` object and any top-level scalar (e.g. `"actions": "bsh"`)
    /// land in the shared map.
    fn from_mapping(mapping: serde_json::Map<String, Value>) -> Self {
        let mut categories = HashMap::new();
        let mut shared = ConfigMap::new();

        for (key, value) in mapping {
            match value {
                Value::Object(entries) if key == SHARED_KEY => {
                    shared.extend(entries);
                }
                Value::Object(entries) => {
                    categories.insert(key, entries.into_iter().collect());
                }
                scalar => {
                    shared.insert(key, scalar);
                }
            }
        }

        Self { categories, shared }
    }

    /// Category config merged over the shared map (category keys win)
    fn resolve(&self, category: &str) -> ConfigMap {
        let mut merged = self.shared.clone();
        if let Some(entries) = self.categories.get(category) {
            merged.extend(entries.clone());
        }
        merged
    }
}

// Only the top of the stack is current. Guarded by a mutex so concurrent
// use is memory-safe; the scope itself is process-global, not thread-local.
static CONTEXT_STACK: Mutex<Vec<ConfigScope>> = Mutex::new(Vec::new());

fn stack() -> std::sync::MutexGuard<'static, Vec<ConfigScope>> {
    CONTEXT_STACK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Entry point for scoped configuration
pub struct TradingContext;

impl TradingContext {
    /// Push a configuration scope and return a guard that pops it on drop.
    ///
    /// The guard releases the scope on every exit path, including unwinds,
    /// so `enter` never needs a matching manual call. Nested scopes fully
    /// shadow outer ones: resolution reads only the innermost scope.
    pub fn enter(config: Value) -> Result<ContextGuard> {
        let mapping = match config {
            Value::Object(mapping) => mapping,
            other => {
                return Err(TradeframeError::Validation(format!(
                    "trading context config must be a mapping, got {other}"
                )))
            }
        };

        let scope = ConfigScope::from_mapping(mapping);
        let mut stack = stack();
        stack.push(scope);
        debug!(depth = stack.len(), "entered trading context");

        Ok(ContextGuard { released: false })
    }

    /// Resolve `category` from the current scope.
    ///
    /// Fails with `ConfigurationUnavailable` when no scope is active.
    pub fn current_for(category: &str) -> Result<ResolvedConfig> {
        let stack = stack();
        let scope = stack
            .last()
            .ok_or_else(|| TradeframeError::ConfigurationUnavailable {
                category: category.to_string(),
            })?;

        Ok(ResolvedConfig::new(category, scope.resolve(category)))
    }

    /// Number of active scopes
    pub fn depth() -> usize {
        stack().len()
    }

    fn pop() -> Result<()> {
        let mut stack = stack();
        if stack.pop().is_none() {
            return Err(TradeframeError::ScopeImbalance);
        }
        debug!(depth = stack.len(), "exited trading context");
        Ok(())
    }
}

/// RAII handle for an entered scope. Pops exactly once, on drop.
#[must_use = "dropping the guard immediately exits the trading context"]
#[derive(Debug)]
pub struct ContextGuard {
    released: bool,
}

impl ContextGuard {
    /// Exit the scope before the end of the lexical block
    pub fn exit(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            // The guard existing means its enter succeeded; an imbalance
            // here indicates a bug, not a caller error.
            if let Err(e) = TradingContext::pop() {
                tracing::warn!("context guard pop failed: {e}");
            }
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.release();
    }
}

// The stack is process-wide, so unit tests that depend on its depth share
// one lock to keep them from interleaving across modules.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard};

    static STACK_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) fn lock_stack() -> MutexGuard<'static, ()> {
        STACK_LOCK.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::lock_stack as lock;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_merges_category_over_shared() {
        let _l = lock();
        let guard = TradingContext::enter(json!({
            "strategy": {"max_position": 500, "base_currency": "EUR"},
            "shared": {"base_currency": "USD", "precision": 2}
        }))
        .unwrap();

        let cfg = TradingContext::current_for("strategy").unwrap();
        assert_eq!(cfg.get::<u64>("max_position"), Some(500));
        // Category keys shadow shared keys
        assert_eq!(cfg.get::<String>("base_currency").as_deref(), Some("EUR"));
        assert_eq!(cfg.get::<u32>("precision"), Some(2));

        guard.exit();
    }

    #[test]
    fn test_unknown_category_sees_only_shared() {
        let _l = lock();
        let guard = TradingContext::enter(json!({
            "strategy": {"max_position": 500},
            "shared": {"base_currency": "USD"}
        }))
        .unwrap();

        let cfg = TradingContext::current_for("rewards").unwrap();
        assert_eq!(cfg.get::<u64>("max_position"), None);
        assert_eq!(cfg.get::<String>("base_currency").as_deref(), Some("USD"));

        guard.exit();
    }

    #[test]
    fn test_no_active_scope_is_an_error() {
        let _l = lock();
        let err = TradingContext::current_for("strategy").unwrap_err();
        assert!(matches!(
            err,
            TradeframeError::ConfigurationUnavailable { ref category } if category == "strategy"
        ));
    }

    #[test]
    fn test_nested_scope_fully_shadows_outer() {
        let _l = lock();
        let outer = TradingContext::enter(json!({
            "strategy": {"max_position": 100},
            "shared": {"base_currency": "USD"}
        }))
        .unwrap();

        {
            let inner = TradingContext::enter(json!({
                "strategy": {"max_position": 500}
            }))
            .unwrap();

            let cfg = TradingContext::current_for("strategy").unwrap();
            assert_eq!(cfg.get::<u64>("max_position"), Some(500));
            // Inner scope has no shared map; outer's does not leak through
            assert_eq!(cfg.get::<String>("base_currency"), None);

            inner.exit();
        }

        let cfg = TradingContext::current_for("strategy").unwrap();
        assert_eq!(cfg.get::<u64>("max_position"), Some(100));
        assert_eq!(cfg.get::<String>("base_currency").as_deref(), Some("USD"));

        outer.exit();
    }

    #[test]
    fn test_scope_released_on_panic() {
        let _l = lock();
        let depth_before = TradingContext::depth();

        let result = std::panic::catch_unwind(|| {
            let _guard = TradingContext::enter(json!({
                "strategy": {"max_position": 500}
            }))
            .unwrap();
            panic!("episode failed mid-scope");
        });

        assert!(result.is_err());
        assert_eq!(TradingContext::depth(), depth_before);
    }

    #[test]
    fn test_top_level_scalars_are_shared() {
        let _l = lock();
        let guard = TradingContext::enter(json!({
            "actions": "bsh",
            "strategy": {"max_position": 500}
        }))
        .unwrap();

        let cfg = TradingContext::current_for("strategy").unwrap();
        assert_eq!(cfg.get::<String>("actions").as_deref(), Some("bsh"));

        guard.exit();
    }

    #[test]
    fn test_non_mapping_config_rejected() {
        let _l = lock();
        let err = TradingContext::enter(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, TradeframeError::Validation(_)));
        // Failed enter must not leave a scope behind
        assert!(TradingContext::current_for("strategy").is_err());
    }
}
