use clap::Parser;
use paanj_admin::cli::{Cli, Commands};
use paanj_admin::config::{mask_secret, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });
    if let Some(secret_key) = cli.secret_key {
        config.admin.secret_key = secret_key;
    }

    // Initialize telemetry
    let _telemetry = paanj_admin::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Listen(args) => {
            tracing::info!("Starting event listener");
            args.execute(&config).await?;
        }
        Commands::Request(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Secret key: {}", mask_secret(&config.admin.secret_key));
            println!("  API URL: {}", config.admin.api_url);
            println!("  WebSocket URL: {}", config.admin.ws_url);
            println!(
                "  Reconnect: enabled={}, interval={}ms, max_attempts={}",
                config.reconnect.enabled,
                config.reconnect.interval_ms,
                config.reconnect.max_attempts
            );
            println!(
                "  Telemetry: level={}, format={:?}",
                config.telemetry.log_level, config.telemetry.log_format
            );
        }
    }

    Ok(())
}
