//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{PROPERTIES_DIR_NAME, USER_DISMISS_PREFIX};
use crate::{PropertyError, PropertyResult};
use std::path::{Path, PathBuf};
use ups_types::{NonEmptyText, NoticeKey};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    property_data_dir: PathBuf,
    dismiss_prefix: NonEmptyText,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The prefix is used verbatim, so it must not contain whitespace: a key like
    /// `user.dismissedNotices. sonarlintAd` would never match a lookup.
    pub fn new(property_data_dir: PathBuf, dismiss_prefix: NonEmptyText) -> PropertyResult<Self> {
        if dismiss_prefix.as_str().chars().any(char::is_whitespace) {
            return Err(PropertyError::InvalidInput(
                "dismiss_prefix cannot contain whitespace".into(),
            ));
        }

        Ok(Self {
            property_data_dir,
            dismiss_prefix,
        })
    }

    pub fn property_data_dir(&self) -> &Path {
        &self.property_data_dir
    }

    pub fn properties_dir(&self) -> PathBuf {
        self.property_data_dir.join(PROPERTIES_DIR_NAME)
    }

    pub fn dismiss_prefix(&self) -> &str {
        self.dismiss_prefix.as_str()
    }

    /// Storage key recording that `notice` has been dismissed.
    pub fn dismissal_key(&self, notice: NoticeKey) -> String {
        format!("{}{}", self.dismiss_prefix, notice.as_str())
    }
}

/// Parse the dismiss prefix from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`USER_DISMISS_PREFIX`].
pub fn dismiss_prefix_from_env_value(value: Option<String>) -> NonEmptyText {
    value
        .and_then(|v| NonEmptyText::new(v).ok())
        .unwrap_or_else(default_dismiss_prefix)
}

fn default_dismiss_prefix() -> NonEmptyText {
    match NonEmptyText::new(USER_DISMISS_PREFIX) {
        Ok(prefix) => prefix,
        Err(_) => unreachable!("USER_DISMISS_PREFIX is a non-empty constant"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_defaults_when_unset_or_blank() {
        assert_eq!(dismiss_prefix_from_env_value(None).as_str(), USER_DISMISS_PREFIX);
        assert_eq!(
            dismiss_prefix_from_env_value(Some("   ".into())).as_str(),
            USER_DISMISS_PREFIX
        );
    }

    #[test]
    fn test_prefix_override_is_trimmed() {
        let prefix = dismiss_prefix_from_env_value(Some(" custom.notices. ".into()));
        assert_eq!(prefix.as_str(), "custom.notices.");
    }

    #[test]
    fn test_new_rejects_prefix_with_inner_whitespace() {
        let result = CoreConfig::new(
            PathBuf::from("data"),
            NonEmptyText::new("user. dismissed").unwrap(),
        );
        assert!(matches!(result, Err(PropertyError::InvalidInput(_))));
    }

    #[test]
    fn test_dismissal_key_concatenates_prefix_and_notice() {
        let cfg = CoreConfig::new(PathBuf::from("data"), dismiss_prefix_from_env_value(None))
            .unwrap();
        assert_eq!(
            cfg.dismissal_key(NoticeKey::SonarlintAd),
            "user.dismissedNotices.sonarlintAd"
        );
        assert_eq!(cfg.properties_dir(), PathBuf::from("data").join("properties"));
    }
}
