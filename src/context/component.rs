//! Injectable components
//!
//! A component resolves its category's configuration from the active
//! trading context exactly once, at construction. The snapshot is immutable
//! afterward and never re-read, even if scopes change underneath it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ConfigMap, TradingContext};
use crate::error::Result;

/// Immutable configuration snapshot captured at component construction
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    category: String,
    values: ConfigMap,
}

impl ResolvedConfig {
    pub(super) fn new(category: &str, values: ConfigMap) -> Self {
        Self {
            category: category.to_string(),
            values,
        }
    }

    /// Category this snapshot was resolved for
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Typed read of a single key. `None` if absent or of the wrong shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Typed read with a fallback
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Raw value access
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A unit of behavior configured through the trading context.
///
/// Implementors tag themselves with a category and call [`Component::resolve`]
/// in their constructor. Construction outside any active scope fails with
/// `ConfigurationUnavailable`.
pub trait Component {
    /// Label under which this type looks up its slice of configuration
    const CATEGORY: &'static str;

    /// One-shot resolution from the currently active scope
    fn resolve() -> Result<ResolvedConfig> {
        TradingContext::current_for(Self::CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::lock_stack;
    use crate::error::TradeframeError;
    use serde_json::json;

    #[derive(Debug)]
    struct Sizer {
        config: ResolvedConfig,
    }

    impl Component for Sizer {
        const CATEGORY: &'static str = "strategy";
    }

    impl Sizer {
        fn new() -> Result<Self> {
            Ok(Self {
                config: Self::resolve()?,
            })
        }
    }

    #[test]
    fn test_component_scenario_from_scope() {
        let _l = lock_stack();
        let guard = TradingContext::enter(json!({
            "strategy": {"max_position": 500},
            "shared": {"base_currency": "USD"}
        }))
        .unwrap();

        let sizer = Sizer::new().unwrap();
        assert_eq!(sizer.config.category(), "strategy");
        assert_eq!(sizer.config.get::<u64>("max_position"), Some(500));
        assert_eq!(
            sizer.config.get::<String>("base_currency").as_deref(),
            Some("USD")
        );

        guard.exit();

        // Snapshot survives scope exit; resolution happened exactly once
        assert_eq!(sizer.config.get::<u64>("max_position"), Some(500));

        // A fresh construction after exit fails
        let err = Sizer::new().unwrap_err();
        assert!(matches!(
            err,
            TradeframeError::ConfigurationUnavailable { .. }
        ));
    }

    #[test]
    fn test_get_or_defaults() {
        let cfg = ResolvedConfig::new(
            "strategy",
            [("max_position".to_string(), json!(500))].into_iter().collect(),
        );

        assert_eq!(cfg.get_or("max_position", 0_u64), 500);
        assert_eq!(cfg.get_or("missing", 7_u64), 7);
        // Wrong shape reads as absent
        assert_eq!(cfg.get::<Vec<String>>("max_position"), None);
    }
}
