//! Command-line front end for the business suite.
//!
//! # Responsibility
//! - Route one request per invocation to the core dispatcher.
//! - Print the JSON envelope and map dispatch status to the exit code.

use bizsuite_core::{
    flush_logging, init_logging, DispatchResponse, Dispatcher, ModuleRegistry, SessionSnapshot,
    SuiteConfig,
};
use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;
use std::path::PathBuf;
use std::process;

/// Business suite: CRM, projects, forms and reports over JSON documents.
#[derive(Parser)]
#[command(name = "bizsuite", version, about = "Business suite module dispatcher")]
struct Cli {
    /// Data directory holding one JSON document per module
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging stays off without it
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Acting user recorded on created records
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered modules
    Modules,

    /// Print the summary of every module
    Dashboard,

    /// Print the full document of one module
    Get {
        /// Module id (crm, proyectos, formularios, informes)
        module: String,
    },

    /// Run an action: body is `{"action": ..., "params": {...}}`
    Post {
        /// Module id (crm, proyectos, formularios, informes)
        module: String,
        /// JSON request body
        body: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            process::exit(2);
        }
    };

    if let Some(log_dir) = &config.log_dir {
        if let Err(message) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: logging disabled: {message}");
        }
    }

    let registry = ModuleRegistry::discover_builtin();
    for skipped in registry.skipped() {
        eprintln!("warning: module `{}` skipped: {}", skipped.id, skipped.reason);
    }
    let dispatcher = Dispatcher::new(&registry, config.data_dir());
    let session = cli
        .user
        .as_deref()
        .map(SessionSnapshot::with_user)
        .unwrap_or_default();

    let code = match &cli.command {
        Commands::Modules => print_json(&dispatcher.list_modules()),
        Commands::Dashboard => print_json(&dispatcher.dashboard(&session)),
        Commands::Get { module } => print_response(dispatcher.fetch(module, &session)),
        Commands::Post { module, body } => match serde_json::from_str::<Value>(body) {
            Ok(body) => print_response(dispatcher.execute(module, &body, &session)),
            Err(err) => {
                eprintln!("error: request body is not valid JSON: {err}");
                2
            }
        },
    };
    let status = if code == 0 { "ok" } else { "error" };
    info!("event=cli_exit module=cli status={status} code={code}");
    flush_logging();
    process::exit(code);
}

fn build_config(cli: &Cli) -> Result<SuiteConfig, String> {
    let mut config = SuiteConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(data_dir) = &cli.data_dir {
        config = config
            .with_data_dir(data_dir.clone())
            .map_err(|err| err.to_string())?;
    }
    if let Some(level) = &cli.log_level {
        config = config.with_log_level(level).map_err(|err| err.to_string())?;
    }
    if let Some(log_dir) = &cli.log_dir {
        config = config
            .with_log_dir(log_dir.clone())
            .map_err(|err| err.to_string())?;
    }
    config.ensure_data_dir().map_err(|err| err.to_string())?;
    Ok(config)
}

fn print_response(response: DispatchResponse) -> i32 {
    print_json(&response.body);
    if response.is_ok() {
        0
    } else {
        eprintln!("status: {}", response.status.http_code());
        1
    }
}

fn print_json(value: &Value) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(err) => {
            eprintln!("error: failed to render response: {err}");
            1
        }
    }
}
