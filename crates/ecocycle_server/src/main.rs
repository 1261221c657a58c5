#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ecocycle_server::start_server().await
}
