//! Time-derived suffixes that make fixture identities unique to one creation
//! call.
//!
//! A [`Suffix`] is built from the wall clock: the Unix seconds modulo 100
//! followed by the microsecond component, e.g. `"32.632506"`. Two
//! suffixes taken inside the same microsecond collide; callers creating
//! fixtures at very high rates should expect the registry to report it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Short string appended to every identity created in one call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Suffix(String);

impl Suffix {
    /// Generate a suffix from the current wall-clock time.
    #[must_use]
    pub fn generate() -> Self { Self::from_time(Utc::now()) }

    /// Derive the suffix for a given instant.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use fresh_fixtures::Suffix;
    ///
    /// let at = Utc.timestamp_opt(1_700_000_032, 632_506_000).unwrap();
    /// assert_eq!(Suffix::from_time(at).as_str(), "32.632506");
    /// ```
    #[must_use]
    pub fn from_time(at: DateTime<Utc>) -> Self {
        // Leap seconds surface as nanos >= 1e9; fold them back into range.
        let micros = at.timestamp_subsec_micros() % 1_000_000;
        Self(format!("{}.{micros:06}", at.timestamp().rem_euclid(100)))
    }

    /// Borrow the suffix text.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for Suffix {
    fn from(value: &str) -> Self { Self(value.to_owned()) }
}

impl From<String> for Suffix {
    fn from(value: String) -> Self { Self(value) }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
