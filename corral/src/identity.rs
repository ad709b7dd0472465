//! Caller identity resolution.
//!
//! Lifecycle operations that enforce ownership need to know who is asking.
//! Identity comes from the process environment; failure to resolve it is
//! an environment problem (`IdentityUnavailable`), not a business error.

use std::env;

use crate::error::{Error, Result};

/// Resolves the calling user from `$USER`, falling back to `$LOGNAME`.
///
/// # Errors
///
/// Returns [`Error::IdentityUnavailable`] if neither variable is set to a
/// non-empty value.
///
/// # Examples
///
/// ```no_run
/// let user = corral::current_user().unwrap();
/// println!("deleting as {user}");
/// ```
pub fn current_user() -> Result<String> {
    for var in ["USER", "LOGNAME"] {
        if let Ok(value) = env::var(var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
    }
    Err(Error::IdentityUnavailable {
        reason: "neither USER nor LOGNAME is set".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_vars<F: FnOnce()>(user: Option<&str>, logname: Option<&str>, f: F) {
        let saved_user = env::var("USER").ok();
        let saved_logname = env::var("LOGNAME").ok();

        match user {
            Some(v) => env::set_var("USER", v),
            None => env::remove_var("USER"),
        }
        match logname {
            Some(v) => env::set_var("LOGNAME", v),
            None => env::remove_var("LOGNAME"),
        }

        f();

        match saved_user {
            Some(v) => env::set_var("USER", v),
            None => env::remove_var("USER"),
        }
        match saved_logname {
            Some(v) => env::set_var("LOGNAME", v),
            None => env::remove_var("LOGNAME"),
        }
    }

    #[test]
    #[serial]
    fn test_user_var_wins() {
        with_vars(Some("alice"), Some("bob"), || {
            assert_eq!(current_user().unwrap(), "alice");
        });
    }

    #[test]
    #[serial]
    fn test_logname_fallback() {
        with_vars(None, Some("carol"), || {
            assert_eq!(current_user().unwrap(), "carol");
        });
    }

    #[test]
    #[serial]
    fn test_unset_is_identity_unavailable() {
        with_vars(None, None, || {
            let err = current_user().unwrap_err();
            assert!(matches!(err, Error::IdentityUnavailable { .. }));
        });
    }

    #[test]
    #[serial]
    fn test_empty_values_ignored() {
        with_vars(Some("  "), None, || {
            assert!(current_user().is_err());
        });
    }
}
