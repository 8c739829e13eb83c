//! Collision detection for hook property tests.

use std::collections::HashMap;

use pitbridge_core::errors::HookError;

/// Remembers which input produced each token and reports a collision when a
/// different input produces a token already seen.
#[derive(Debug, Default)]
pub struct HookRegistry {
    seen: HashMap<String, String>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `input -> token`. Re-recording the same input is not a collision.
    pub fn record(&mut self, input: impl Into<String>, token: &str) -> Result<(), HookError> {
        let input = input.into();
        match self.seen.get(token) {
            Some(first) if *first != input => Err(HookError::HookCollision {
                token: token.to_string(),
                first: first.clone(),
                second: input,
            }),
            Some(_) => Ok(()),
            None => {
                self.seen.insert(token.to_string(), input);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
