//! Constants used throughout the UPS core crate.
//!
//! Path, filename and key constants live here so the store and the services agree on
//! a single spelling.

/// Default prefix namespacing dismissal keys in the property store.
///
/// The full storage key is this prefix followed by the notice's wire value, e.g.
/// `user.dismissedNotices.sonarlintAd`.
pub const USER_DISMISS_PREFIX: &str = "user.dismissedNotices.";

/// Default directory for property data when no explicit directory is configured.
pub const DEFAULT_PROPERTY_DATA_DIR: &str = "property_data";

/// Directory name for per-user property files, under the property data directory.
pub const PROPERTIES_DIR_NAME: &str = "properties";

/// Filename for a user's property file.
pub const PROPERTIES_FILENAME: &str = "properties.yaml";

/// Lock file serialising commits across every store opened on the same directory.
pub const COMMIT_LOCK_FILENAME: &str = ".commit.lock";

/// Suffix of the uniquely named temporary file written before an atomic rename.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";
