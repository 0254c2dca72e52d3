use bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};

use crate::config::DatabaseConfig;
use crate::entity::blog::BlogDocument;
use crate::store::mongo::COLLECTION;

pub async fn init_db(config: &DatabaseConfig) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&config.url).await?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

    let client = Client::with_options(options)?;
    Ok(client.database(&config.name))
}

/// Create the collection indexes. Idempotent; runs at every startup.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let blogs = db.collection::<BlogDocument>(COLLECTION);

    let indexes = [
        // Full-text search across the written content.
        IndexModel::builder()
            .keys(doc! { "title": "text", "subtitle": "text", "body": "text" })
            .build(),
        IndexModel::builder().keys(doc! { "tags": 1 }).build(),
        IndexModel::builder().keys(doc! { "visibility": 1 }).build(),
        IndexModel::builder().keys(doc! { "date": -1 }).build(),
        IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build(),
    ];

    blogs.create_indexes(indexes).await?;
    Ok(())
}
