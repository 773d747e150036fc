mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, StorageBackend};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::annotations::{routes as annotations_routes, AnnotationService};
use crate::features::auth;
use crate::features::comments::{routes as comments_routes, CommentService};
use crate::features::media::handlers::MediaState;
use crate::features::media::{routes as media_routes, AccessService, MediaService};
use crate::features::org_invites::{routes as invites_routes, InviteService};
use crate::features::organizations::{routes as organizations_routes, OrganizationService};
use crate::features::realtime::{routes as realtime_routes, RealtimeState, RoomHub};
use crate::features::shares::{routes as shares_routes, ShareService};
use crate::features::system::{routes as system_routes, SystemState};
use crate::features::users::middleware::resolve_current_user;
use crate::features::users::{routes as users_routes, UserService};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
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

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Keycloak token validation
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url(),
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.client_id.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configured for issuer {}", config.auth.issuer);

    let storage = modules::storage::create_storage(&config.storage)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize media storage: {}", e))?;
    tracing::info!("Media storage initialized ({})", storage.backend_name());

    let user_service = Arc::new(UserService::new(pool.clone()));
    let access_service = Arc::new(AccessService::new(pool.clone()));
    let media_service = Arc::new(MediaService::new(
        pool.clone(),
        Arc::clone(&storage),
        Arc::clone(&access_service),
    ));
    let comment_service = Arc::new(CommentService::new(
        pool.clone(),
        Arc::clone(&access_service),
    ));
    let annotation_service = Arc::new(AnnotationService::new(
        pool.clone(),
        Arc::clone(&access_service),
    ));
    let organization_service = Arc::new(OrganizationService::new(pool.clone()));
    let share_service = Arc::new(ShareService::new(
        pool.clone(),
        Arc::clone(&access_service),
        Arc::clone(&organization_service),
    ));
    let invite_service = Arc::new(InviteService::new(
        pool.clone(),
        Arc::clone(&user_service),
        Arc::clone(&organization_service),
    ));
    tracing::info!("Collaboration services initialized");

    let room_hub = Arc::new(RoomHub::new(config.realtime.room_channel_capacity));
    tracing::info!(
        "Realtime hub initialized (room capacity {})",
        config.realtime.room_channel_capacity
    );

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

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

    // Protected routes: the JWT check runs first, then the caller is resolved to a local user
    let protected_routes = Router::new()
        .merge(users_routes::routes(Arc::clone(&user_service)))
        .merge(media_routes::routes(MediaState {
            service: media_service,
            max_upload_size: config.upload.max_upload_size,
        }))
        .merge(comments_routes::routes(comment_service))
        .merge(annotations_routes::routes(annotation_service))
        .merge(shares_routes::routes(share_service))
        .merge(organizations_routes::routes(organization_service))
        .merge(invites_routes::routes(invite_service))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&user_service),
            resolve_current_user,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Public routes (no auth required); `/ws` authenticates during the handshake
    let public_routes = Router::new()
        .merge(system_routes::routes(SystemState {
            pool: pool.clone(),
            hub: Arc::clone(&room_hub),
        }))
        .merge(realtime_routes::routes(RealtimeState {
            hub: room_hub,
            validator: jwt_validator,
            users: user_service,
            access: access_service,
        }));

    let mut app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes);

    if config.storage.backend == StorageBackend::Local {
        app = app.nest_service(
            modules::storage::LOCAL_SERVE_PATH,
            ServeDir::new(&config.storage.local.upload_dir),
        );
        tracing::info!(
            "Serving uploads from {} at {}",
            config.storage.local.upload_dir,
            modules::storage::LOCAL_SERVE_PATH
        );
    }

    let app = app
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

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

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
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
