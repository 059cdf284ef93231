#[tokio::main]
async fn main() -> anyhow::Result<()> {
    event_registration::server::run().await
}
