//! Application provides GraphQL API of the Moodify mood tracker over the
//! [`Service`].

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

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use std::sync::Arc;

use axum::{
    extract::WebSocketUpgrade,
    response::{IntoResponse, Response},
    Extension, Json,
};
use derive_more::Debug;
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::{extract::JuniperRequest, subscriptions};
use juniper_graphql_ws::ConnectionConfig;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tower_http as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
};

/// Storage backing the [`Service`].
#[cfg(not(any(test, feature = "memory")))]
pub type Storage = service::infra::Postgres;

/// Storage backing the [`Service`].
#[cfg(any(test, feature = "memory"))]
pub type Storage = service::infra::Memory;

/// [`service::Service`] over the [`Storage`].
pub type Service = service::Service<Storage>;

/// Maximum size of a single WebSocket message of a GraphQL subscription.
const WS_MAX_MESSAGE_SIZE: usize = 4096;

/// Maximum number of simultaneously running operations of a single GraphQL
/// subscription connection.
const WS_MAX_IN_FLIGHT_OPERATIONS: usize = 10;

/// Response of the GraphQL API, failed with the `status_code` unless every
/// operation succeeded.
#[derive(Debug)]
pub struct JuniperResponse<S: ScalarValue = DefaultScalarValue> {
    /// [`http::StatusCode`] to respond with if any operation failed.
    pub status_code: http::StatusCode,

    /// Results of the executed operations.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S: ScalarValue> IntoResponse for JuniperResponse<S> {
    fn into_response(self) -> Response {
        let status = if self.response.is_ok() {
            http::StatusCode::OK
        } else {
            self.status_code
        };
        (status, Json(self.response)).into_response()
    }
}

/// Executes GraphQL queries and mutations sent over HTTP.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    ctx: Context,
    JuniperRequest(req): JuniperRequest,
) -> JuniperResponse {
    let response = req.execute(&*schema, &ctx).await;
    JuniperResponse {
        status_code: ctx.error_status_code(),
        response,
    }
}

/// Serves GraphQL subscriptions over a WebSocket.
///
/// Clients authenticate with the `authToken` connection variable.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn subscriptions(
    Extension(schema): Extension<Arc<api::Schema>>,
    mut ctx: Context,
    ws: WebSocketUpgrade,
) -> Response {
    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .max_frame_size(WS_MAX_MESSAGE_SIZE)
        .max_message_size(WS_MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| {
            subscriptions::serve_ws(socket, schema, move |vars| async move {
                ctx.authorize_subscription(&vars)?;
                Ok::<_, Error>(
                    ConnectionConfig::new(ctx)
                        .with_max_in_flight_operations(
                            WS_MAX_IN_FLIGHT_OPERATIONS,
                        ),
                )
            })
        })
}
