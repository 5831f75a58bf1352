mod config;
mod error;
mod routes;
mod state;

use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() {
    let config = config::Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_task_api=debug,info".into()),
        )
        .init();

    let db = PgPoolOptions::new()
        .connect(&config.database_url)
        .await
        .expect("Error connecting DB");

    sqlx::migrate!()
        .run(&db)
        .await
        .expect("Error running migrations");

    let addr = config.addr();
    let state = state::AppState::new(db, &config);

    let app = routes::routes(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    tracing::info!("server is chilling at http://{}", addr);

    axum::serve(listener, app).await.unwrap();
}
