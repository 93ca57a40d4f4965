use rusty_lending::{
    adapters::mock::BookCatalog as MockBookCatalog,
    adapters::postgres::PgLoanStore,
    api::{handlers::AppState, router::create_router},
    application::loan::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_lending=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Resolve configuration once; everything below receives it explicitly
    let config = AppConfig::from_env();
    tracing::info!("Database URL: {}", config.database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Apply migrations (creates the loans table and the partial unique
    // index that enforces one outstanding loan per book)
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Initialize adapters
    // The catalog is an external collaborator; until the real catalog
    // service is wired in, the in-memory adapter stands in for it.
    let loan_store = Arc::new(PgLoanStore::new(pool));
    let book_catalog = Arc::new(MockBookCatalog::new());

    // Create service dependencies
    let service_deps = ServiceDependencies {
        loan_store,
        book_catalog,
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
