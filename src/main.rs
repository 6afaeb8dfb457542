use eventdesk::{config::Config, state::AppState, store::Store};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("eventdesk=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env()?;

    let store = Store::default();
    eventdesk::log_store_changes(&store);
    if config.seed_demo {
        eventdesk::seed_if_empty(&store);
    }

    let app = eventdesk::app(AppState::new(store), &config.assets_dir);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
