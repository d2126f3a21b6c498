//! Entry point: CLI flags, logging setup, graph open, server run.
//!
//! The flag surface is hand-parsed rather than built on a derive-based CLI
//! framework: the external contract (`-version`, `-help`, `-debug`,
//! `-db <path>`) is Go-flag-style single-dash, which a `clap`-derived parser
//! would not produce without fighting its conventions.

mod format;
mod server;
mod tools;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use graphdb_core::PersistentGraph;

const VERSION: &str = env!("CARGO_PKG_VERSION");

struct Args {
    debug: bool,
    db_path: Option<PathBuf>,
}

enum ParsedArgs {
    Run(Args),
    PrintVersion,
    PrintHelp,
}

fn usage() -> String {
    format!(
        "graphdb-server {VERSION}\n\
         \n\
         A local, labeled multi-graph database exposed as a JSON-RPC tool server over stdio.\n\
         \n\
         Usage: graphdb-server [flags]\n\
         \n\
         Flags:\n\
         \x20 -version       print version string, exit 0\n\
         \x20 -help          print this message, exit 0\n\
         \x20 -debug         enable diagnostic logging on stderr\n\
         \x20 -db <path>     persistent mode at <path>; absence selects in-memory mode\n"
    )
}

fn parse_args<I: Iterator<Item = String>>(mut argv: I) -> Result<ParsedArgs, String> {
    let mut debug = false;
    let mut db_path = None;

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "-version" | "--version" => return Ok(ParsedArgs::PrintVersion),
            "-help" | "--help" | "-h" => return Ok(ParsedArgs::PrintHelp),
            "-debug" => debug = true,
            "-db" => {
                let path = argv
                    .next()
                    .ok_or_else(|| "-db requires a path argument".to_string())?;
                db_path = Some(PathBuf::from(path));
            }
            other => return Err(format!("unrecognized flag: {other}")),
        }
    }

    Ok(ParsedArgs::Run(Args { debug, db_path }))
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Bridge `log`-facade records emitted by graphdb-core into the same
    // tracing subscriber, so one `-debug` flag controls both layers.
    let log_level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    tracing_log::LogTracer::init_with_filter(log_level).ok();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match parse_args(args.into_iter()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("graphdb-server: {e}\n\n{}", usage());
            return ExitCode::FAILURE;
        }
    };

    let args = match parsed {
        ParsedArgs::PrintVersion => {
            println!("graphdb-server {VERSION}");
            return ExitCode::SUCCESS;
        }
        ParsedArgs::PrintHelp => {
            print!("{}", usage());
            return ExitCode::SUCCESS;
        }
        ParsedArgs::Run(args) => args,
    };

    init_logging(args.debug);

    let graph = match &args.db_path {
        Some(path) => match PersistentGraph::open(path) {
            Ok(g) => g,
            Err(e) => {
                tracing::error!("failed to open database at {:?}: {e}", path);
                return ExitCode::FAILURE;
            }
        },
        None => match PersistentGraph::in_memory() {
            Ok(g) => g,
            Err(e) => {
                tracing::error!("failed to initialize in-memory graph: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("graphdb-server: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let graph = Arc::new(graph);
    let result = runtime.block_on(run_until_shutdown(Arc::clone(&graph)));
    let _ = graph.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("graphdb-server exited with error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run the server until stdin reaches EOF or a cancellation signal (SIGINT /
/// ctrl-c) arrives, whichever comes first. Either path finishes the
/// in-flight request before returning; nothing beyond that is elaborated.
async fn run_until_shutdown(graph: Arc<PersistentGraph>) -> anyhow::Result<()> {
    tokio::select! {
        result = server::run_server(graph) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received interrupt, shutting down");
            Ok(())
        }
    }
}
