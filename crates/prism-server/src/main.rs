use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use prism_api::auth::{self, AppState, AppStateInner};
use prism_api::middleware::require_auth;
use prism_api::{comments, messages, posts, users};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prism=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("PRISM_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("PRISM_DB_PATH").unwrap_or_else(|_| "prism.db".into());
    let host = std::env::var("PRISM_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PRISM_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = prism_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner { db, jwt_secret });

    // Routes
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/users/{user_id}", get(users::get_profile))
        .route("/posts", get(posts::list_posts))
        .route("/posts/{post_id}", get(posts::get_post))
        .route("/posts/{post_id}/comments", get(comments::list_comments))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", put(users::update_profile))
        .route("/users/{user_id}/follow", put(users::toggle_follow))
        .route("/posts", post(posts::create_post))
        .route("/posts/feed", get(posts::feed))
        .route("/posts/saved", get(posts::saved_posts))
        .route("/posts/{post_id}", put(posts::update_post))
        .route("/posts/{post_id}", delete(posts::delete_post))
        .route("/posts/{post_id}/like", put(posts::toggle_like))
        .route("/posts/{post_id}/save", put(posts::toggle_save))
        .route("/posts/{post_id}/comments", post(comments::create_comment))
        .route("/posts/{post_id}/comments/{comment_id}", delete(comments::delete_comment))
        .route("/messages", post(messages::send_message))
        .route("/messages", get(messages::get_conversations))
        .route("/messages/requests", get(messages::get_message_requests))
        .route("/messages/{conversation_id}", get(messages::get_conversation_messages))
        .route("/messages/{conversation_id}", put(messages::update_conversation))
        .layer(middleware::from_fn(require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Prism server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
