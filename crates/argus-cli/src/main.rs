//! `argus` – Argus ground-station command line interface.
//!
//! This binary is the operator shell for the inspection robot. It:
//!
//! 1. Loads `~/.argus/config.toml`, writing the defaults on first run.
//! 2. Builds a [`Session`] drawing onto the terminal and runs its
//!    [`EventLoop`] on a Tokio runtime.
//! 3. Drops the operator into an **interactive REPL** on its own thread:
//!    slash-commands drive the shell, everything else is a robot console
//!    line.
//! 4. Intercepts **Ctrl-C** to close the robot link and exit cleanly.

mod config;
mod repl;
mod terminal;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{info, warn};

use argus_runtime::{EventLoop, Session, SessionEvent};

use crate::terminal::TerminalSurfaces;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Must run before the runtime is built. ARGUS_LOG_FORMAT=json switches to
    // JSON lines; OTEL_EXPORTER_OTLP_ENDPOINT adds span export.
    let _tracing = argus_runtime::init_tracing("argus");

    print_banner();

    let cfg = load_config();
    println!(
        "  Robot link: {}   Simulator port: {}",
        cfg.robot_url.bold(),
        cfg.sim_port.to_string().bold()
    );

    // ── Operator queue and shared shutdown flag ───────────────────────────
    let (events_tx, events_rx) = mpsc::channel::<SessionEvent>(64);
    let shutdown = Arc::new(AtomicBool::new(false));

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let ctrlc_tx = events_tx.clone();
    let ctrlc_shutdown = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – closing the robot link …".yellow().bold());
        ctrlc_shutdown.store(true, Ordering::SeqCst);
        if ctrlc_tx.try_send(SessionEvent::Shutdown).is_err() {
            warn!("operator queue unavailable; shutdown request dropped");
        }
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Runtime ───────────────────────────────────────────────────────────
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start the async runtime".red(), e);
            std::process::exit(1);
        }
    };

    let surfaces = TerminalSurfaces::new();
    let dashboard = surfaces.dashboard();
    let session = Session::new(cfg.session_config(), surfaces);
    let event_loop = EventLoop::new(session, cfg.link_config()).with_sim(cfg.sim_settings());

    println!();
    println!(
        "  Type {} for shell commands, {} to try the simulator.\n",
        "/help".bold().cyan(),
        "/sim".bold().cyan()
    );

    // ── Interactive REPL ──────────────────────────────────────────────────
    let repl_shutdown = shutdown.clone();
    std::thread::spawn(move || repl::run(events_tx, dashboard, repl_shutdown));

    runtime.block_on(async move {
        let session = event_loop.run(events_rx).await;
        info!(state = ?session.link_state(), "session closed");
    });

    shutdown.store(true, Ordering::SeqCst);
    println!("{}", "  ✓ Exiting Argus.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn load_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"    ___                         "#.bold().cyan());
    println!("{}", r#"   /   |  _________ ___  _______"#.bold().cyan());
    println!("{}", r#"  / /| | / ___/ __ `/ / / / ___/"#.bold().cyan());
    println!("{}", r#" / ___ |/ /  / /_/ / /_/ (__  ) "#.bold().cyan());
    println!("{}", r#"/_/  |_/_/   \__, /\__,_/____/  "#.bold().cyan());
    println!("{}", r#"            /____/              "#.bold().cyan());
    println!();
    println!("  {} {}",
        "Argus".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Industrial Inspection Bot ground station");
    println!();
}
