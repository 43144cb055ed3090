use blob_client_lib::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    blob_client_lib::init_tracing();
    blob_client_lib::run(ClientConfig::from_env()).await
}
