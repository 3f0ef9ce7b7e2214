use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use album_db::{init_pool, run_migrations};
use album_server::{create_router, AppState, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: DATABASE_URL (default: sqlite://album.db)");
            eprintln!("Optional: LISTEN_ADDR (default: 0.0.0.0:3000)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting album server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Database: {}", config.database_url);

    let pool = match init_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Database connection error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("Migration error: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Database schema ready");

    let app = create_router(AppState::new(pool));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server running at http://{}", config.listen_addr);

    axum::serve(listener, app).await.expect("Server error");
}
