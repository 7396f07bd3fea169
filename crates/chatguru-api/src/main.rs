//! ChatGuru CLI and REST API entry point.
//!
//! Binary name: `chatguru`
//!
//! Parses CLI arguments, loads configuration, brings up the model backend
//! (an existing server or a supervised `llama-server`), then dispatches to
//! the chat loop, the REST API, or a one-shot command.

mod cli;
mod http;
mod state;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;
use console::style;

use chatguru_infra::config::{load_config, resolve_data_dir};
use chatguru_infra::llm::{ModelBackend, create_provider, start_backend};
use chatguru_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands, ModelArgs};
use state::AppState;

/// How often `serve` looks for idle sessions.
const SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,chatguru=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!("failed to init tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        json,
        quiet,
        model,
        command,
        ..
    } = cli;

    match command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "chatguru", &mut std::io::stdout());
            Ok(())
        }

        Commands::Personas => cli::persona::list_personas(json),

        Commands::Chat { persona } => {
            let runtime = Runtime::start(&model, json || quiet).await?;
            let result = cli::chat::loop_runner::run_chat_loop(
                &runtime.state,
                persona.as_deref(),
                &runtime.base_url,
            )
            .await;
            runtime.finish(result).await
        }

        Commands::Check => {
            let runtime = Runtime::start(&model, json || quiet).await?;
            let result = cli::check::check_backend(&runtime.state, &runtime.base_url, json).await;
            runtime.finish(result).await
        }

        Commands::Serve { port, host } => {
            let runtime = Runtime::start(&model, json || quiet).await?;
            let http_config = runtime.state.config.http.clone();
            let host = host.unwrap_or(http_config.host);
            let port = port.unwrap_or(http_config.port);
            let result = serve(runtime.state.clone(), &host, port).await;
            runtime.finish(result).await
        }
    }
}

/// A running model backend and the state wired around it.
struct Runtime {
    backend: ModelBackend,
    base_url: String,
    state: AppState,
}

impl Runtime {
    /// Load config, apply flag overrides, and bring the backend up.
    async fn start(overrides: &ModelArgs, silent: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let mut config = load_config(&data_dir).await;
        overrides.apply(&mut config);
        config.validate().context("invalid configuration")?;

        if !silent && config.server.base_url.is_none() {
            println!(
                "\n  {} Loading {} ...",
                style("*").cyan().bold(),
                style(config.model.model_path.display()).dim()
            );
        }

        let backend = start_backend(&config)
            .await
            .context("model backend unavailable")?;
        let base_url = backend.base_url();
        let provider = create_provider(&config.model, &config.server, &base_url);

        Ok(Self {
            backend,
            base_url,
            state: AppState::new(provider, config),
        })
    }

    /// Stop the backend, then hand back the command's result.
    async fn finish(self, result: anyhow::Result<()>) -> anyhow::Result<()> {
        self.backend.shutdown().await;
        result
    }
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let sweeper = state.config.http.session_idle_limit().map(|idle| {
        state
            .sessions
            .spawn_idle_sweeper(idle, idle.min(SWEEP_PERIOD))
    });

    println!(
        "  {} ChatGuru API listening on {}",
        style("⚡").bold(),
        style(format!("http://{addr}")).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    served?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
