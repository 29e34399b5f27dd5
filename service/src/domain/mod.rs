//! Domain definitions.

pub mod mood_entry;
pub mod user;

pub use self::{mood_entry::MoodEntry, user::User};
