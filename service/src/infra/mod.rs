//! Infrastructure layer.

pub mod database;
pub mod feed;

#[cfg(any(test, feature = "memory"))]
pub use self::database::{memory, Memory};
pub use self::{database::Database, feed::Feed};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
