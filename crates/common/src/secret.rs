//! Wrapper for credential material (OAuth client secret, access tokens)

use std::fmt;
use zeroize::Zeroize;

/// Sensitive string - redacted in Debug/Display/logs, wiped on drop
pub struct Secret(String);

impl Secret {
    /// Wrap a sensitive value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the inner value (use sparingly, never in log fields)
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_redacts_debug() {
        let secret = Secret::new("GOCSPX-client-secret");
        let debug = format!("{:?}", secret);
        assert_eq!(debug, "[REDACTED]");
        assert!(!debug.contains("GOCSPX"));
    }

    #[test]
    fn test_secret_redacts_display() {
        let secret = Secret::new("GOCSPX-client-secret");
        assert_eq!(secret.to_string(), "[REDACTED]");
    }

    #[test]
    fn test_secret_exposes_value() {
        let secret = Secret::new("GOCSPX-client-secret");
        assert_eq!(secret.expose(), "GOCSPX-client-secret");
        assert!(!secret.is_empty());
    }

    #[test]
    fn test_clone_preserves_value() {
        let secret = Secret::new("s3cr3t");
        let copy = secret.clone();
        drop(secret);
        assert_eq!(copy.expose(), "s3cr3t");
    }
}
