//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_mood_entry;
pub mod create_user;
pub mod create_user_session;
pub mod delete_mood_entry;
pub mod update_mood_entry;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_mood_entry::CreateMoodEntry, create_user::CreateUser,
    create_user_session::CreateUserSession,
    delete_mood_entry::DeleteMoodEntry, update_mood_entry::UpdateMoodEntry,
};
