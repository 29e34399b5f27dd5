//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;

use std::time::Duration;

use derive_more::Debug;

#[cfg(doc)]
use infra::Database;

use self::infra::Feed;
pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`Duration`] a newly created [`Session`] stays valid for.
    ///
    /// [`Session`]: domain::user::Session
    pub session_ttl: Duration,
}

impl Config {
    /// Creates a new [`Config`] signing [JWT]s with the provided HMAC
    /// `secret`.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[must_use]
    pub fn with_secret(secret: &[u8], session_ttl: Duration) -> Self {
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl,
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Feed`] of [`MoodEntry`] changes committed by this [`Service`].
    ///
    /// [`MoodEntry`]: domain::MoodEntry
    feed: Feed,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self {
            config,
            database,
            feed: Feed::default(),
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Feed`] of this [`Service`].
    #[must_use]
    pub fn feed(&self) -> &Feed {
        &self.feed
    }
}

/// Creates a new [`Service`] over an empty [`infra::Memory`] database.
#[cfg(test)]
pub(crate) fn in_memory() -> Service<infra::Memory> {
    Service::new(
        Config::with_secret(b"test", Duration::from_secs(60)),
        infra::Memory::default(),
    )
}
