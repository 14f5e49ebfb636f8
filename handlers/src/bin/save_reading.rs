use handlers::config::Config;
use handlers::db::DynamoStore;
use handlers::lambda::handle_save;
use lambda_http::{run, service_fn, Error, Request};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .init();

    let store = DynamoStore::connect(Config::table_name_from_env()).await;
    info!("save_reading ready, table: {}", store.table_name());

    let store = &store;
    run(service_fn(|event: Request| async move {
        handle_save(store, event).await
    }))
    .await
}
