//! GH2HF Deployer - Entry Point
//!
//! Serves the deployment API, or runs one of the maintenance commands.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use tracing::{error, info};

use api_models::{CheckResult, CheckStatus, HealthReport};
use gh2hf::app::options::AppOptions;
use gh2hf::app::run::run;
use gh2hf::config::Settings;
use gh2hf::diagnostics::run_checks;
use gh2hf::logs::{init_logging, LogOptions};
use gh2hf::remote::{HttpConnector, RemoteConnector};
use gh2hf::utils::version_info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        println!("{}", serde_json::to_string_pretty(&version)?);
        return Ok(());
    }

    let mut settings = Settings::from_env().context("Invalid configuration")?;
    if let Some(host) = cli_args.get("host") {
        settings.host = host.clone();
    }
    if let Some(port) = cli_args.get("port") {
        settings.port = port
            .parse()
            .with_context(|| format!("Invalid --port value: {}", port))?;
    }
    if let Some(level) = cli_args.get("log-level") {
        settings.log_level = level.parse().map_err(anyhow::Error::msg)?;
    }

    // Run diagnostics
    if cli_args.contains_key("diagnostic") || cli_args.contains_key("diag") {
        let connector = HttpConnector::new(&settings)?;
        let report = run_checks(&settings.credentials, &connector).await;
        print_report(&report);
        return Ok(());
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        log_dir: settings.log_dir.clone(),
        json_format: settings.log_json,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            println!("Failed to initialize logging: {e}");
            None
        }
    };

    // Manual cleanup of a Space
    if let Some(name) = cli_args.get("delete-space") {
        return delete_space(&settings, name).await;
    }

    let settings = Arc::new(settings);
    let options = AppOptions::from_settings(&settings);
    info!("Running GH2HF deployer {} with options: {:?}", version.version, options);

    if let Err(e) = run(settings, options, await_shutdown_signal()).await {
        error!("Failed to run the deployer: {e}");
        return Err(e.into());
    }
    Ok(())
}

async fn delete_space(settings: &Settings, name: &str) -> anyhow::Result<()> {
    let credentials = &settings.credentials;
    let (Some(token), Some(username)) = (credentials.hf_token(), credentials.hf_username.as_deref())
    else {
        anyhow::bail!("HUGGINGFACE_TOKEN and HUGGINGFACE_USERNAME are required to delete a Space");
    };

    let space_id = if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", username, name)
    };

    let connector = HttpConnector::new(settings)?;
    connector
        .spaces(token, username)?
        .delete_space(&space_id)
        .await
        .with_context(|| format!("Failed to delete Space {}", space_id))?;

    println!("{} {}", "Deleted".green().bold(), space_id);
    Ok(())
}

fn print_check(name: &str, check: &CheckResult) {
    let status = match check.status {
        CheckStatus::Success => "ok".green().bold(),
        CheckStatus::Error => "error".red().bold(),
        CheckStatus::Unknown => "unknown".yellow().bold(),
    };
    println!("  {:<12} {:<8} {}", name, status, check.message);
}

fn print_report(report: &HealthReport) {
    println!("{}", "GH2HF deployer diagnostics".bold());
    print_check("environment", &report.checks.environment);
    print_check("github", &report.checks.github);
    print_check("huggingface", &report.checks.huggingface);

    let summary = match report.status {
        CheckStatus::Success => report.message.green(),
        _ => report.message.red(),
    };
    println!("{}", summary);
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            _ => {
                error!("Unable to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
