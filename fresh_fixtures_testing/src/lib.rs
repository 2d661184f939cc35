//! Test doubles for suites built on `fresh_fixtures`.
//!
//! [`ScriptedDirectory`] stands in for a real user directory and can be told
//! to fail, panic, hang or stall when deleting particular fixtures.
//!
//! ```rust
//! use fresh_fixtures_testing::{Deletion, ScriptedDirectory};
//!
//! let directory = ScriptedDirectory::new()
//!     .on_delete("bob", Deletion::Fail("no such user".into()))
//!     .on_delete("kate", Deletion::Hang);
//! assert_eq!(directory.delete_calls(), 0);
//! ```

pub mod directory;
pub mod logging;

pub use directory::{CREATED_KEY, Deletion, ScriptedDirectory, scripted_directory};
pub use logging::{LogCapture, logs};
