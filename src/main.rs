use anyhow::Context;
use owo_colors::OwoColorize;
use scholar::cli::commands::{self, DigestOptions};
use scholar::cli::output::Output;
use scholar::cli::{Cli, Commands};
use scholar::ConfigManager;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(default_level: &str, verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scholar={},tower_http={}", level, level)));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let manager = Arc::new(
        ConfigManager::new(&cli.config)
            .with_context(|| format!("Failed to load {}", cli.config.display()))?,
    );
    let config = manager.config();
    init_tracing(&config.server.log_level, cli.verbose, cli.log_json);

    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Commands::Serve { host, port } => {
            commands::serve(Arc::clone(&manager), host, port, &output).await?
        }
        Commands::Summarize { source } => commands::summarize(&config, &source, &output).await?,
        Commands::Transcript {
            video,
            file,
            languages,
        } => {
            commands::transcript(
                &config,
                video.as_deref(),
                file.as_deref(),
                &languages,
                &output,
            )
            .await?
        }
        Commands::Debate {
            pdf,
            points,
            no_judge,
        } => commands::debate(&config, &pdf, points, no_judge, &output).await?,
        Commands::Graph {
            pdf,
            output: out,
            keywords,
        } => commands::graph(&config, &pdf, out, &keywords, &output).await?,
        Commands::Digest {
            query,
            max_results,
            hours_back,
            sources,
            catchy,
        } => {
            let options = DigestOptions {
                query,
                max_results,
                hours_back,
                sources,
                catchy,
            };
            commands::digest(&config, options, &output).await?
        }
        Commands::Config { validate } => commands::show_config(&manager, validate, &output)?,
    }

    Ok(())
}
