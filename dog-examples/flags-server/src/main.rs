use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = flags_server::load_config();
    let ax = flags_server::build(&config.snapshot())?;

    let host = config.get("http.host").unwrap_or("127.0.0.1").to_string();
    let port = config.get("http.port").unwrap_or("3030").to_string();

    ax.listen(format!("{host}:{port}")).await?;

    Ok(())
}
