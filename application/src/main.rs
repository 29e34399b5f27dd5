//! Moodify GraphQL API server.

use std::{future, io, process::ExitCode, sync::Arc, time::Duration};

use application::{
    api, config, graphql, subscriptions, Args, Config, Service, Storage,
};
use axum::{
    body::Body,
    extract::MatchedPath,
    routing::{get, on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing as log;
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter},
    fmt::MakeWriter,
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt as _,
    Registry,
};

/// Handle adjusting the maximum level of the emitted logs at runtime.
type LevelHandle = reload::Handle<LevelFilter, Registry>;

#[cfg(not(feature = "memory"))]
service::infra::postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() -> ExitCode {
    let level = init_logging();
    match run(&level).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

/// Installs the global logger.
///
/// Warnings and errors go to stderr, everything else goes to stdout. Logs are
/// emitted at [`LevelFilter::INFO`] until the returned handle changes it.
fn init_logging() -> LevelHandle {
    let (level, handle) = reload::Layer::new(LevelFilter::INFO);
    let alarming =
        |meta: &log::Metadata<'_>| *meta.level() <= log::Level::WARN;

    tracing_subscriber::registry()
        .with(level)
        .with(
            fmt_layer(io::stdout)
                .with_filter(filter_fn(move |m| m.is_span() || !alarming(m))),
        )
        .with(
            fmt_layer(io::stderr)
                .with_filter(filter_fn(move |m| m.is_span() || alarming(m))),
        )
        .init();

    handle
}

/// Creates a compact formatting [`Layer`] writing into the provided `writer`.
fn fmt_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync
where
    S: log::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_thread_names(true)
        .with_writer(writer)
}

/// Loads the [`Config`], prepares the [`Storage`] and serves the API until
/// a shutdown signal arrives.
async fn run(level: &LevelHandle) -> Result<(), ()> {
    let Args { config } = Args::parse().unwrap_or_else(|e| e.exit());

    let Config {
        server,
        service,
        postgres,
        log: log_conf,
    } = Config::load(&config).map_err(|e| {
        log::error!("failed to load `Config` from `{config}`: {e}");
    })?;
    level
        .modify(|l| *l = log_conf.level.into())
        .map_err(|e| log::error!("failed to apply log level: {e}"))?;

    let storage = storage(postgres).await?;
    let app = router(Service::new(service.into(), storage))
        .layer(cors(&server.cors)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span::<Body>)
                .on_response(record_response::<Body>),
        );

    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        log::error!("failed to listen on `{addr}`: {e}");
    })?;
    log::info!("listening on `{addr}`");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))?;

    log::info!("stopped");
    Ok(())
}

/// Connects to Postgres and brings its schema up to date.
#[cfg(not(feature = "memory"))]
async fn storage(conf: config::Postgres) -> Result<Storage, ()> {
    let mut db = Storage::new(&conf.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;
    let report = migrations::runner()
        .run_async(&mut db)
        .await
        .map_err(|e| log::error!("failed to run database migrations: {e}"))?;
    log::info!("applied {} migrations", report.applied_migrations().len());
    Ok(db)
}

/// Creates an empty in-memory storage.
#[cfg(feature = "memory")]
async fn storage(_: config::Postgres) -> Result<Storage, ()> {
    log::warn!("using in-memory storage, all data is lost on shutdown");
    Ok(Storage::default())
}

/// Routes the GraphQL endpoints to the provided [`Service`].
fn router(service: Service) -> Router {
    let schema = api::Schema::new(api::Query, api::Mutation, api::Subscription);

    Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .route("/subscriptions", get(subscriptions))
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
}

/// Builds a [`CorsLayer`] allowing the configured origins.
///
/// A `*` origin allows any origin.
fn cors(conf: &config::Cors) -> Result<CorsLayer, ()> {
    let origins = if conf.origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            conf.origins
                .iter()
                .map(|o| {
                    o.parse::<http::HeaderValue>().map_err(|e| {
                        log::error!("`{o}` is not a valid CORS origin: {e}");
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
        ])
        .allow_origin(origins))
}

/// Opens a [`log::Span`] for the provided HTTP request.
fn request_span<B>(req: &http::Request<B>) -> log::Span {
    let client_ip = InsecureClientIp::from(req.headers(), req.extensions())
        .map(|ip| ip.0.to_string())
        .ok();

    log::info_span!(
        "HTTP request",
        http.client_ip = client_ip,
        http.flavor = ?req.version(),
        http.method = req.method().as_str(),
        http.route = req
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        http.target = req
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = req
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok()),
        http.status_code = log::field::Empty,
    )
}

/// Records the status of the provided HTTP response into its [`log::Span`].
fn record_response<B>(
    res: &http::Response<B>,
    latency: Duration,
    span: &log::Span,
) {
    let status = res.status();
    _ = span.record("http.status_code", status.as_u16());

    let latency = format!("{}ms", latency.as_millis());
    if status.is_client_error() || status.is_server_error() {
        log::warn!(%latency, "request failed");
    } else {
        log::info!(%latency, "request served");
    }
}

/// Resolves once the process is asked to stop.
async fn shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => log::info!("shutting down"),
        Err(e) => {
            log::error!("failed to listen for shutdown signal: {e}");
            future::pending::<()>().await;
        }
    }
}
