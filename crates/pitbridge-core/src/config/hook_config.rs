//! Hook token delimiters.

use serde::{Deserialize, Serialize};

use crate::errors::{PitBridgeError, PitBridgeResult};

/// Reserved characters used when encoding hook tokens. Raw values containing
/// any of them are escaped with `escape`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Between concept and qualifier.
    pub namespace_delimiter: char,
    /// Between components of a composite hook.
    pub composite_delimiter: char,
    /// Between a hook and its valid_from anchor.
    pub pit_delimiter: char,
    pub escape: char,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            namespace_delimiter: '|',
            composite_delimiter: '~',
            pit_delimiter: '@',
            escape: '\\',
        }
    }
}

impl HookConfig {
    /// All four characters must be distinct, and none may appear in the
    /// epoch encoding (digits, `-`, `:`, `.`, `T`, `Z`) or in a concept name.
    pub fn validate(&self) -> PitBridgeResult<()> {
        let chars = [
            self.namespace_delimiter,
            self.composite_delimiter,
            self.pit_delimiter,
            self.escape,
        ];
        for (i, a) in chars.iter().enumerate() {
            if chars[i + 1..].contains(a) {
                return Err(PitBridgeError::ConfigError(format!(
                    "hook delimiter {a:?} is used for more than one role"
                )));
            }
            if a.is_ascii_alphanumeric() || matches!(a, '-' | ':' | '.' | '_') {
                return Err(PitBridgeError::ConfigError(format!(
                    "hook delimiter {a:?} collides with concept or epoch characters"
                )));
            }
        }
        Ok(())
    }
}
