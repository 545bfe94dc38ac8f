//! `upwatch-tui`: terminal dashboard for an upwatch monitoring server.
//!
//! Shows a login form until a token is stored, then the monitored-site
//! table with live background refresh. Profiles, token storage and TLS
//! settings are shared with the `upwatch` CLI.
//!
//! Logs go to a file (default `/tmp/upwatch-tui.log`) so the terminal
//! stays clean.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use upwatch_config::Profile;
use upwatch_core::{Dashboard, TlsVerification};

use crate::app::App;

/// Terminal dashboard for upwatch uptime monitoring.
#[derive(Parser, Debug)]
#[command(name = "upwatch-tui", version, about)]
struct Cli {
    /// Profile to use (defaults to the config's default profile)
    #[arg(short, long, env = "UPWATCH_PROFILE")]
    profile: Option<String>,

    /// Server URL, overriding the profile
    #[arg(short, long, env = "UPWATCH_SERVER")]
    server: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long, env = "UPWATCH_INSECURE")]
    insecure: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/upwatch-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. Hold the returned guard until exit so buffered
/// lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "upwatch_tui={log_level},upwatch_core={log_level},upwatch_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("upwatch-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Everything the app needs to start: the dashboard plus login prefill.
struct Session {
    dashboard: Dashboard,
    profile_name: String,
    username: Option<String>,
}

/// Resolve the profile (flags > config file) into a ready dashboard.
fn build_session(cli: &Cli) -> Result<Session> {
    let config_file = upwatch_config::config_path();
    let cfg = upwatch_config::load_config_or_default();
    let profile_name = cli
        .profile
        .clone()
        .unwrap_or_else(|| cfg.active_profile_name().to_owned());

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None if cli.server.is_some() => Profile::default(),
        None => {
            return Err(eyre!(
                "no server configured for profile '{profile_name}' (looked in {}). \
                 Run `upwatch config init` or pass --server",
                config_file.display()
            ));
        }
    };
    if let Some(ref server) = cli.server {
        profile.server.clone_from(server);
    }

    let mut config = upwatch_config::profile_to_dashboard_config(&profile, &cfg.defaults)?;
    if cli.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }

    let tokens = upwatch_config::token_store_for(&profile, &profile_name, &config_file);
    let dashboard = Dashboard::new(config, tokens)?;

    Ok(Session {
        dashboard,
        username: upwatch_config::resolve_username(&profile),
        profile_name,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let session = build_session(&cli)?;
    info!(
        profile = %session.profile_name,
        server = %session.dashboard.config().url,
        "starting upwatch-tui"
    );

    let mut app = App::new(session.dashboard, session.profile_name, session.username);
    app.run().await?;

    Ok(())
}
