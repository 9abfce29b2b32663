use clap::Parser;
use tracing_subscriber::EnvFilter;
use ui_testgen::cli::commands::{cmd_batch, cmd_interactive, cmd_serve, cmd_url};
use ui_testgen::cli::config::{Cli, Commands, Settings, load_config};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli);

    let config = load_config(cli.config.as_deref());

    // Settings are fixed from here on.
    let settings = Settings::resolve(&cli, &config, |key| std::env::var(key).ok());

    let ok = match &cli.command {
        Commands::Url { url, output } => cmd_url(&settings, url, output.as_deref())?,
        Commands::Batch { archive, output } => cmd_batch(&settings, archive, output.as_deref())?,
        Commands::Serve { bind } => {
            cmd_serve(settings.clone(), bind.as_deref())?;
            true
        }
        Commands::Interactive => cmd_interactive(&settings)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` raises the level. The server logs at
/// `info` by default, one-shot commands only warn.
fn init_logging(cli: &Cli) {
    let base = match (cli.verbose, &cli.command) {
        (0, Commands::Serve { .. }) => "info",
        (0, _) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
