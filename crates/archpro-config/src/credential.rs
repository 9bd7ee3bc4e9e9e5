//! Credential resolution for live generation
//!
//! A credential is usable when it is non-empty, is not the literal
//! `"undefined"` that front-end build tooling substitutes for a missing
//! variable, and is at least [`MIN_CREDENTIAL_LEN`] characters long.
//! An unusable or absent credential is not an error: it selects demo mode.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Shortest credential accepted as usable
pub const MIN_CREDENTIAL_LEN: usize = 6;

/// Placeholder left behind when a variable was never defined
pub const UNDEFINED_SENTINEL: &str = "undefined";

/// Validity predicate for a raw credential value.
///
/// ```rust
/// use archpro_config::credential::is_usable_credential;
///
/// assert!(!is_usable_credential(""));
/// assert!(!is_usable_credential("undefined"));
/// assert!(!is_usable_credential("abc12"));
/// assert!(is_usable_credential("abc123"));
/// ```
#[must_use]
pub fn is_usable_credential(value: &str) -> bool {
    !value.is_empty() && value != UNDEFINED_SENTINEL && value.chars().count() >= MIN_CREDENTIAL_LEN
}

/// A credential that passed [`is_usable_credential`].
///
/// `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accept `value` only if it is usable.
    #[must_use]
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        is_usable_credential(&value).then_some(Self(value))
    }

    /// The raw value, for request headers and download URIs only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Supplies the current credential.
///
/// Read on every generation call, so a credential selected mid-session
/// takes effect immediately.
pub trait CredentialSource: Send + Sync {
    /// The usable credential, if any.
    fn current(&self) -> Option<Credential>;

    /// Where the credential comes from, for diagnostics (never the value).
    fn describe(&self) -> String;
}

/// Reads the credential from a process environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    var: String,
}

impl EnvCredentialSource {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl CredentialSource for EnvCredentialSource {
    fn current(&self) -> Option<Credential> {
        std::env::var(&self.var).ok().and_then(Credential::parse)
    }

    fn describe(&self) -> String {
        format!("env:{}", self.var)
    }
}

/// Fixed credential (or none), for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<Credential>);

impl StaticCredential {
    /// No credential; every call runs in demo mode.
    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }

    /// Wraps `value`; an unusable value behaves like [`StaticCredential::none`].
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Credential::parse(value))
    }
}

impl CredentialSource for StaticCredential {
    fn current(&self) -> Option<Credential> {
        self.0.clone()
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// A process-local selection layered over another source.
///
/// The selected credential wins when present; otherwise the inner source
/// is consulted. This backs the interactive `key <value>` command.
pub struct SelectedCredentialSource {
    selected: RwLock<Option<Credential>>,
    inner: Arc<dyn CredentialSource>,
}

impl SelectedCredentialSource {
    #[must_use]
    pub fn new(inner: Arc<dyn CredentialSource>) -> Self {
        Self {
            selected: RwLock::new(None),
            inner,
        }
    }

    /// Select `value` for the rest of the process. Returns `false` and
    /// leaves the selection unchanged when the value is unusable.
    pub fn select(&self, value: &str) -> bool {
        match Credential::parse(value) {
            Some(credential) => {
                *self.selected.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
                true
            }
            None => false,
        }
    }

    /// Drop the process-local selection.
    pub fn clear(&self) {
        *self.selected.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl CredentialSource for SelectedCredentialSource {
    fn current(&self) -> Option<Credential> {
        self.selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .or_else(|| self.inner.current())
    }

    fn describe(&self) -> String {
        if self.has_selection() {
            "selected".to_string()
        } else {
            self.inner.describe()
        }
    }
}
