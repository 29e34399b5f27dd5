//! GraphQL API definitions.

pub mod mood_entry;
mod mutation;
mod query;
pub mod scalar;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    mood_entry::MoodEntry, mutation::Mutation, query::Query,
    subscription::Subscription, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum CredentialsError {
        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Provided email is not a valid email address"]
        InvalidEmail,

        #[code = "WEAK_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Password must be from 6 to 128 characters long"]
        WeakPassword,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Provided email is occupied by another `User`"]
        EmailOccupied,

        #[code = "USER_NOT_FOUND"]
        #[status = FORBIDDEN]
        #[message = "No `User` is registered with the provided email"]
        UserNotFound,

        #[code = "WRONG_PASSWORD"]
        #[status = FORBIDDEN]
        #[message = "Provided password does not match the `User`'s one"]
        WrongPassword,
    }
}

define_error! {
    enum MoodEntryError {
        #[code = "MOOD_ENTRY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`MoodEntry` with the specified ID does not exist"]
        NotExists,
    }
}
