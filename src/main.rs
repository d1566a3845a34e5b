mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::categories::repositories::PgCategoryRepository;
use crate::features::categories::CategoryService;
use crate::features::posts::repositories::PgPostRepository;
use crate::features::posts::PostService;
use crate::features::site::{SiteService, SiteState};
use crate::modules::history::{HistoryWriter, PgHistoryWriter};
use crate::modules::storage::{MinIOClient, S3ImageStore};
use crate::modules::web_pages::PgWebPageRegistry;
use crate::shared::constants::{CATEGORY_IMAGE_NAMESPACE, POST_IMAGE_NAMESPACE};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Extension, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    database::run_migrations(&pool).await?;

    // Initialize MinIO storage, one image namespace per content kind
    let minio_client = Arc::new(MinIOClient::new(config.minio.clone()).await?);
    let category_images = Arc::new(S3ImageStore::new(
        Arc::clone(&minio_client),
        CATEGORY_IMAGE_NAMESPACE,
    ));
    let post_images = Arc::new(S3ImageStore::new(
        Arc::clone(&minio_client),
        POST_IMAGE_NAMESPACE,
    ));
    tracing::info!("MinIO image stores initialized");

    let web_pages = Arc::new(
        PgWebPageRegistry::new(
            pool.clone(),
            &config.blog.site_url,
            config.blog.default_lang_id,
        )
        .await?,
    );
    let history: Arc<dyn HistoryWriter> = Arc::new(PgHistoryWriter::new(pool.clone()));

    // Initialize blog services
    let category_repository = Arc::new(PgCategoryRepository::new(pool.clone()));
    let post_repository = Arc::new(PgPostRepository::new(pool.clone()));

    let category_service = Arc::new(
        CategoryService::new(
            category_repository,
            post_repository.clone(),
            web_pages.clone(),
            category_images,
            post_images.clone(),
        )
        .with_history(Arc::clone(&history)),
    );
    let post_service = Arc::new(
        PostService::new(
            post_repository.clone(),
            Arc::clone(&category_service),
            web_pages.clone(),
            post_images,
        )
        .with_history(Arc::clone(&history)),
    );
    let site_service = Arc::new(SiteService::new(
        post_repository,
        Arc::clone(&category_service),
        web_pages,
    ));
    tracing::info!("Blog services initialized");

    let blog_config = Arc::new(config.blog.clone());
    let site_state = SiteState {
        site: site_service,
        categories: Arc::clone(&category_service),
        posts: Arc::clone(&post_service),
        config: Arc::clone(&blog_config),
    };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(features::router(category_service, post_service, site_state))
        .merge(health_route)
        .layer(Extension(blog_config))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
