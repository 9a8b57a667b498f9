//! Bearer credentials for Google REST backends.

use std::fmt;

/// Where an OAuth bearer token comes from.
///
/// Environment lookups happen on every call so a token refreshed by an
/// external agent is picked up without a restart.
#[derive(Clone)]
pub enum BearerToken {
    /// Read from this environment variable at call time.
    Env(String),
    /// Fixed token (tests, short-lived tools).
    Static(String),
}

impl BearerToken {
    /// Resolve the token, or describe why it is unavailable.
    pub fn resolve(&self) -> Result<String, String> {
        match self {
            Self::Env(var) => match std::env::var(var) {
                Ok(token) if !token.trim().is_empty() => Ok(token),
                _ => Err(format!("access token variable `{var}` is not set")),
            },
            Self::Static(token) => Ok(token.clone()),
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::Static(_) => f.write_str("Static(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_resolves() {
        assert_eq!(BearerToken::Static("t".into()).resolve().unwrap(), "t");
    }

    #[test]
    fn missing_env_is_reported() {
        let err = BearerToken::Env("BUDGET_RELAY_TEST_UNSET_TOKEN".into())
            .resolve()
            .unwrap_err();
        assert!(err.contains("BUDGET_RELAY_TEST_UNSET_TOKEN"));
    }

    #[test]
    fn debug_redacts_static_token() {
        assert_eq!(format!("{:?}", BearerToken::Static("secret".into())), "Static(<redacted>)");
    }
}
