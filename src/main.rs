use anyhow::Context;
use smash_client::{
    app::{page::Document, App},
    config::get_configuration,
    telemetry::get_subscriber,
};
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_configuration().context("Failed to read configuration.")?;

    get_subscriber(&config.log_level, std::io::stderr).init();

    let container_id = config.feed.container_id.clone();
    let app = App::with(config)?;
    let document = Document::new(app.client().base_url().clone()).with_container(&container_id);

    let count = app.on_load(&document).await;
    tracing::info!(count, "rendered feed cards");

    for card in document.children(&container_id).unwrap_or_default() {
        println!("{}", card);
    }

    Ok(())
}
