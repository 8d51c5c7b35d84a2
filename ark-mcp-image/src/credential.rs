//! API key resolution.

/// Resolves the bearer token for a single call.
///
/// A key passed with the tool call wins; otherwise the key configured for the
/// process (`ARK_API_KEY`) is used. The fallback is read from the environment
/// once at startup and injected here, not re-read on every call.
#[derive(Clone, Default)]
pub struct CredentialResolver {
    fallback: Option<String>,
}

impl CredentialResolver {
    /// Create a resolver with the process-wide fallback key.
    pub fn new(fallback: Option<String>) -> Self {
        Self {
            fallback: fallback.filter(|key| !key.is_empty()),
        }
    }

    /// Return the explicit key if non-empty, else the fallback (which may be absent).
    pub fn resolve(&self, explicit: Option<&str>) -> Option<String> {
        match explicit {
            Some(key) if !key.is_empty() => Some(key.to_string()),
            _ => self.fallback.clone(),
        }
    }

    /// Whether a fallback key is configured.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("has_fallback", &self.has_fallback())
            .finish()
    }
}
