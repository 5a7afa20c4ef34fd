use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use testgen::{router, AppConfig, AppState, CodeAnalyzer, ProviderKind, TestGenerator, TestService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "testgen")]
#[command(about = "Serve the AI test generator over HTTP")]
struct Cli {
    /// Address to bind
    #[arg(long, env = "TESTGEN_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,
    /// Hosted model provider
    #[arg(long, env = "TESTGEN_PROVIDER", value_enum, default_value_t = ProviderKind::Gemini)]
    provider: ProviderKind,
    /// Model name (defaults to the provider's default model)
    #[arg(long, env = "TESTGEN_MODEL")]
    model: Option<String>,
    /// Override the provider API base URL
    #[arg(long, env = "TESTGEN_BASE_URL")]
    base_url: Option<String>,
    /// Seconds to wait for the provider before giving up
    #[arg(long, env = "TESTGEN_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::from_env(
        SocketAddr::new(cli.host, cli.port),
        cli.provider,
        cli.model,
        cli.base_url,
        Duration::from_secs(cli.timeout_secs),
    )
    .inspect_err(|e| error!("Refusing to start: {}", e))?;

    let provider = config.build_provider()?;
    info!(
        "Using {} provider (model: {}, timeout: {:?})",
        provider.provider_name(),
        config.provider_config.model,
        config.timeout
    );

    let generator = TestGenerator::new(provider, config.generator_config());
    let service = TestService::new(CodeAnalyzer::new(), generator);
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("AI Test Generator listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
