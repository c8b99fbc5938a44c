use anyhow::{Context, Result};
use camlink::model::{ConnectionState, IceServerConfig};
use camlink::{Environment, LinkConfig, LinkManager, LinkSnapshot};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "camlink", version, about = "Camera link diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach to the camera link and print every published change until Ctrl-C.
    Probe {
        /// Signaling endpoint; defaults to the one for `--env`.
        #[arg(long)]
        url: Option<String>,

        #[arg(long, default_value = "development")]
        env: Environment,

        /// STUN/TURN server URL, repeatable.
        #[arg(long = "stun")]
        stun: Vec<String>,

        /// Give up after this many scheduled reconnects.
        #[arg(long)]
        max_attempts: Option<u32>,

        #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
        log_format: LogFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe {
            url,
            env,
            stun,
            max_attempts,
            log_format,
        } => {
            init_tracing(log_format);

            let mut config = LinkConfig::for_environment(env).with_max_reconnect_attempts(max_attempts);
            if let Some(url) = url {
                config = config.with_signaling_url(url);
            }
            if !stun.is_empty() {
                config = config.with_ice_servers(stun.into_iter().map(IceServerConfig::stun).collect());
            }

            probe(config).await?;
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn probe(config: LinkConfig) -> Result<()> {
    let handle = LinkManager::spawn(&config).context("Invalid link configuration")?;
    info!(url = %config.signaling_url, "Probing camera link");

    println!("{}", format!("📡 Probing {}", config.signaling_url).cyan().bold());

    let mut updates = handle.subscribe();
    handle.start_observing();
    print_snapshot(&updates.borrow_and_update().clone());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_snapshot(&snapshot);
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "🛑 Stopping...".yellow());
                break;
            }
        }
    }

    handle.stop_observing();
    handle.shutdown().await;
    println!("{}", "✨ Link closed".green().bold());
    Ok(())
}

fn print_snapshot(snapshot: &LinkSnapshot) {
    let state = snapshot.state.to_string();
    let state = match snapshot.state {
        ConnectionState::Connected => state.green().bold(),
        ConnectionState::Connecting | ConnectionState::Reconnecting => state.yellow(),
        ConnectionState::Failed => state.red().bold(),
        ConnectionState::Disconnected => state.dimmed(),
    };

    let mut line = format!("   state: {state}");
    if let Some(track) = &snapshot.track {
        line.push_str(&format!("  track: {} ({})", track.id(), track.kind()));
    }
    if let Some(message) = snapshot.error_message() {
        line.push_str(&format!("  error: {}", message.red()));
    }
    println!("{line}");
}
