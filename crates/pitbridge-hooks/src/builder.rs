//! HookBuilder: pure, deterministic token construction.
//!
//! Token grammar with the default delimiters:
//!
//! ```text
//! hook        = concept "|" escaped(qualifier)
//! composite   = escaped(c1) "~" escaped(c2) "~" ...
//! pit hook    = hook "@" instant
//! epoch hook  = "epoch.date|" YYYY-MM-DD
//! ```
//!
//! Concepts are lowercase identifiers, qualifiers escape every reserved
//! character, and composites escape the composite delimiter inside each
//! component. Instants use a fixed-width nanosecond encoding containing no
//! reserved character, so every constructor is injective.

use chrono::{DateTime, NaiveDate, Utc};

use pitbridge_core::config::HookConfig;
use pitbridge_core::errors::HookError;
use pitbridge_core::models::{Hook, PitHook};

/// Concept of epoch hooks. `.` is not allowed in entity concepts, so epoch
/// hooks can never be mistaken for entity hooks.
pub const EPOCH_CONCEPT: &str = "epoch.date";

const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds hooks using the configured delimiters.
#[derive(Debug, Clone, Default)]
pub struct HookBuilder {
    config: HookConfig,
}

impl HookBuilder {
    pub fn new(config: HookConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// `hook(concept, qualifier)`.
    pub fn hook(&self, concept: &str, qualifier: &str) -> Result<Hook, HookError> {
        validate_concept(concept)?;
        if qualifier.is_empty() {
            return Err(HookError::EmptyQualifier {
                concept: concept.to_string(),
            });
        }

        let reserved = [
            self.config.namespace_delimiter,
            self.config.composite_delimiter,
            self.config.pit_delimiter,
        ];
        let mut token = String::with_capacity(concept.len() + qualifier.len() + 1);
        token.push_str(concept);
        token.push(self.config.namespace_delimiter);
        self.escape_into(&mut token, qualifier, &reserved);
        Ok(Hook::from_token(token))
    }

    /// Ordered composite of component tokens.
    pub fn composite_hook(&self, components: &[&str]) -> Result<Hook, HookError> {
        if components.is_empty() {
            return Err(HookError::EmptyComposite);
        }
        Ok(Hook::from_token(self.join_components(components)))
    }

    /// Anchor a hook at `valid_from`.
    pub fn pit_hook(&self, hook: &Hook, valid_from: DateTime<Utc>) -> PitHook {
        let mut token = String::with_capacity(hook.as_str().len() + 31);
        token.push_str(hook.as_str());
        token.push(self.config.pit_delimiter);
        token.push_str(&encode_instant(valid_from));
        PitHook::from_token(token)
    }

    /// PIT hook of a zero-length version `[t, t)`. Such a version shares
    /// `valid_from` with its successor, so its anchor also carries the
    /// version number.
    pub fn degenerate_pit_hook(&self, hook: &Hook, valid_from: DateTime<Utc>, version: u32) -> PitHook {
        let mut token = self.pit_hook(hook, valid_from).into_string();
        token.push_str("#v");
        token.push_str(&version.to_string());
        PitHook::from_token(token)
    }

    /// Calendar-anchored hook for an event date.
    pub fn epoch_hook(&self, date: NaiveDate) -> Hook {
        Hook::from_token(format!(
            "{EPOCH_CONCEPT}{}{}",
            self.config.namespace_delimiter,
            date.format(DATE_FORMAT)
        ))
    }

    /// Recover the date encoded in an epoch hook.
    pub fn epoch_date(&self, hook: &Hook) -> Result<NaiveDate, HookError> {
        hook.as_str()
            .strip_prefix(EPOCH_CONCEPT)
            .and_then(|rest| rest.strip_prefix(self.config.namespace_delimiter))
            .and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok())
            .ok_or_else(|| HookError::MalformedEpochHook {
                token: hook.as_str().to_string(),
            })
    }

    /// `concat(peripheral, valid_from, primary PIT hook, foreign PIT hooks)`.
    /// An unresolved foreign PIT hook encodes as the empty component.
    pub fn bridge_pit_hook(
        &self,
        peripheral: &str,
        valid_from: DateTime<Utc>,
        primary: &PitHook,
        foreign: &[Option<&PitHook>],
    ) -> PitHook {
        let anchor = encode_instant(valid_from);
        let mut parts: Vec<&str> = Vec::with_capacity(3 + foreign.len());
        parts.push(peripheral);
        parts.push(&anchor);
        parts.push(primary.as_str());
        parts.extend(foreign.iter().map(|f| f.map_or("", PitHook::as_str)));
        PitHook::from_token(self.join_components(&parts))
    }

    /// `concat(bridge PIT hook, epoch hook)`.
    pub fn event_pit_hook(&self, bridge_pit_hook: &PitHook, epoch_hook: &Hook) -> PitHook {
        PitHook::from_token(
            self.join_components(&[bridge_pit_hook.as_str(), epoch_hook.as_str()]),
        )
    }

    fn join_components(&self, components: &[&str]) -> String {
        let delimiter = self.config.composite_delimiter;
        let mut token =
            String::with_capacity(components.iter().map(|c| c.len() + 1).sum::<usize>());
        for (i, component) in components.iter().enumerate() {
            if i > 0 {
                token.push(delimiter);
            }
            self.escape_into(&mut token, component, &[delimiter]);
        }
        token
    }

    fn escape_into(&self, out: &mut String, raw: &str, reserved: &[char]) {
        let escape = self.config.escape;
        for ch in raw.chars() {
            if ch == escape || reserved.contains(&ch) {
                out.push(escape);
            }
            out.push(ch);
        }
    }
}

/// Fixed-width UTC encoding used for PIT anchors.
pub fn encode_instant(instant: DateTime<Utc>) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

/// Concepts are non-empty lowercase identifiers.
pub fn is_valid_concept(concept: &str) -> bool {
    !concept.is_empty()
        && concept
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn validate_concept(concept: &str) -> Result<(), HookError> {
    if is_valid_concept(concept) {
        Ok(())
    } else {
        Err(HookError::InvalidConcept {
            concept: concept.to_string(),
        })
    }
}
