#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wordlink_client::run().await
}
