use std::process::ExitCode;

use dirserve::server::signal;
use dirserve::{logger, Config, Server};

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Build the Tokio runtime, sizing the thread pool from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = config.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config))
}

/// Bind, announce, and serve until a shutdown signal arrives
async fn run(config: Config) -> ExitCode {
    if let Err(e) = logger::init(&config) {
        eprintln!("Failed to open log files: {e}");
        return ExitCode::FAILURE;
    }

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            logger::log_bind_failure(&e);
            return ExitCode::FAILURE;
        }
    };

    logger::log_server_start(&server.local_addr(), server.config());

    // A missing root is not fatal: it may appear once the bundle builds
    let root = &server.config().content.root;
    if !root.is_dir() {
        logger::log_warning(&format!(
            "Content root '{}' does not exist yet; requests will 404 until it does",
            root.display()
        ));
    }

    let shutdown = signal::spawn_shutdown_listener();
    server.serve(shutdown).await;

    logger::log_server_stopped();
    ExitCode::SUCCESS
}
