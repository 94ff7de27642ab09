#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lockgate_host::run().await
}
