//! Settings module
//!
//! User profile options layered on top of the INI store

pub mod profile;

pub use profile::{Profile, ProfileEntry, PROFILE_FILENAME};
