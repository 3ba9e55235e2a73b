//! REPL – Read-Eval-Print Loop for the Argus operator shell.
//!
//! Lines starting with `/` drive the shell itself; anything else goes to the
//! robot console exactly as typed.
//!
//! Supported slash-commands:
//!   /connect [url]       – open the robot link (configured URL by default)
//!   /disconnect          – close the robot link
//!   /sim                 – start the local simulated robot and connect to it
//!   /mode                – toggle MANUAL / AUTO
//!   /goto <lat,lng>      – route to a point (map "Go To")
//!   /inspect <lat,lng>   – route to a point for inspection (map "Inspect")
//!   /status              – session summary
//!   /gauges              – gas gauges and chart window
//!   /thermal             – thermal camera preview
//!   /obstacles           – ultrasonic sensor bands
//!   /map                 – bot position, route and destination
//!   /help                – show this list
//!   /quit | /exit        – gracefully exit the shell

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use argus_runtime::SessionEvent;
use argus_runtime::console::parse_goto;
use argus_types::ActionKind;
use tokio::sync::mpsc;

use crate::terminal::{self, SharedDashboard};

/// A dashboard view rendered by the REPL itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Gauges,
    Thermal,
    Obstacles,
    Map,
}

/// What one line of input asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplAction {
    Send(SessionEvent),
    Show(View),
    Help,
    Quit,
    Usage(&'static str),
    Unknown(String),
}

/// Classify one input line. Returns `None` for blank input.
pub fn parse(line: &str) -> Option<ReplAction> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(ReplAction::Send(SessionEvent::Input(line.to_string())));
    }

    let (cmd, args) = match line.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (line, ""),
    };
    let action = match cmd {
        "/connect" => {
            let url = (!args.is_empty()).then(|| args.to_string());
            ReplAction::Send(SessionEvent::Connect(url))
        }
        "/disconnect" => ReplAction::Send(SessionEvent::Disconnect),
        "/sim" => ReplAction::Send(SessionEvent::StartSim),
        "/mode" => ReplAction::Send(SessionEvent::ToggleMode),
        "/goto" => map_action(args, ActionKind::GoTo, "/goto <lat,lng>"),
        "/inspect" => map_action(args, ActionKind::Inspect, "/inspect <lat,lng>"),
        "/status" => ReplAction::Send(SessionEvent::Status),
        "/gauges" => ReplAction::Show(View::Gauges),
        "/thermal" => ReplAction::Show(View::Thermal),
        "/obstacles" => ReplAction::Show(View::Obstacles),
        "/map" => ReplAction::Show(View::Map),
        "/help" => ReplAction::Help,
        "/quit" | "/exit" => ReplAction::Quit,
        other => ReplAction::Unknown(other.to_string()),
    };
    Some(action)
}

fn map_action(args: &str, action: ActionKind, usage: &'static str) -> ReplAction {
    match parse_goto(args) {
        Ok(at) => ReplAction::Send(SessionEvent::MapAction(at, action)),
        Err(_) => ReplAction::Usage(usage),
    }
}

/// Entry point for the interactive REPL. Blocks on stdin, so run it on its
/// own thread.
///
/// Exits on `/quit`, end of input, or when `shutdown` is set; in every case
/// a [`SessionEvent::Shutdown`] is sent so the event loop stops too.
pub fn run(events: mpsc::Sender<SessionEvent>, dashboard: SharedDashboard, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "argus>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let Some(action) = parse(&line) else {
            continue;
        };
        match action {
            ReplAction::Send(event) => {
                if events.blocking_send(event).is_err() {
                    break;
                }
            }
            ReplAction::Show(view) => show(view, &dashboard),
            ReplAction::Help => cmd_help(),
            ReplAction::Usage(usage) => {
                println!("{} {}", "Usage:".yellow(), usage.bold());
            }
            ReplAction::Quit => {
                println!("{}", "Goodbye.".green());
                break;
            }
            ReplAction::Unknown(other) => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
        }
    }

    shutdown.store(true, Ordering::SeqCst);
    let _ = events.blocking_send(SessionEvent::Shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// Command implementations
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "  Shell commands:".bold());
    let commands = [
        ("/connect [url]", "Open the robot link"),
        ("/disconnect", "Close the robot link"),
        ("/sim", "Start the simulated robot and connect to it"),
        ("/mode", "Toggle MANUAL / AUTO control mode"),
        ("/goto <lat,lng>", "Route to a point"),
        ("/inspect <lat,lng>", "Route to a point for inspection"),
        ("/status", "Link, mode, position, gas and route summary"),
        ("/gauges", "Gas gauges"),
        ("/thermal", "Thermal camera preview"),
        ("/obstacles", "Ultrasonic sensor bands"),
        ("/map", "Bot position, route and destination"),
        ("/help", "Show this help message"),
        ("/quit | /exit", "Exit the shell"),
    ];
    for (cmd, desc) in commands {
        println!("    {:<22} {}", cmd.cyan(), desc);
    }
    println!();
    println!(
        "  Anything else is a robot console line (try {}).",
        "help".bold()
    );
    println!();
}

fn show(view: View, dashboard: &SharedDashboard) {
    let snapshot = terminal::lock(dashboard);
    let (title, lines) = match view {
        View::Gauges => ("Gas", terminal::gauge_lines(&snapshot)),
        View::Thermal => match &snapshot.raster {
            Some(raster) => ("Thermal", terminal::thermal_lines(raster)),
            None => ("Thermal", vec!["no frame received yet".dimmed().to_string()]),
        },
        View::Obstacles => {
            let lines = terminal::obstacle_lines(&snapshot);
            if lines.is_empty() {
                ("Obstacles", vec!["no ranges received yet".dimmed().to_string()])
            } else {
                ("Obstacles", lines)
            }
        }
        View::Map => ("Map", terminal::map_lines(&snapshot)),
    };
    println!();
    println!("  {}", title.bold());
    for line in lines {
        println!("    {line}");
    }
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
