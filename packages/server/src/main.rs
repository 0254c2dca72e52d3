use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{Level, info};

use common::media::cloudinary::CloudinaryStore;
use server::config::AppConfig;
use server::state::AppState;
use server::store::mongo::MongoBlogStore;
use server::{build_router, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database).await?;
    database::ensure_indexes(&db).await?;
    info!("Connected to MongoDB");

    let media = CloudinaryStore::new(
        config.media.cloud_name.clone(),
        config.media.api_key.clone(),
        config.media.api_secret.clone(),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        store: Arc::new(MongoBlogStore::new(&db)),
        media: Arc::new(media),
        config: Arc::new(config),
    };

    let app = build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
