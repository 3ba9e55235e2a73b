//! Command console.
//!
//! Every non-empty operator line is echoed. `help`, `about`, `clear` and
//! `mode` are answered locally and never reach the robot. Everything else,
//! `goto` included, is forwarded as `{"cmd": "<line>"}`; when no link is open
//! a warning is printed instead. A well-formed `goto <lat,lng>` additionally
//! starts a route from the live position.

use argus_types::{ActionKind, ArgusError, LatLng};
use tracing::{debug, info};

use crate::session::{NOT_CONNECTED, Session};
use crate::surfaces::Surfaces;

pub const PROMPT: &str = "argus-bot: $";

pub const GOTO_USAGE: &str = "Invalid format. Use: goto <lat,lng>";

const HELP: &[&str] = &[
    "help         -> Show this help menu",
    "about        -> Show bot details and version",
    "clear        -> Clear terminal output",
    "mode         -> Show current control mode",
    "goto <x,y>   -> Move to specific coordinate (plot on map)",
    "Anything else is sent to the robot as a command.",
];

/// What one operator line means.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Help,
    About,
    Clear,
    Mode,
    /// `goto` with its parsed target, or the reason it could not be parsed.
    GoTo(Result<LatLng, String>),
    Remote(String),
}

impl ConsoleCommand {
    /// Classify a line. Returns `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let command = match line {
            "help" => ConsoleCommand::Help,
            "about" => ConsoleCommand::About,
            "clear" => ConsoleCommand::Clear,
            "mode" => ConsoleCommand::Mode,
            _ => match line.split_once(char::is_whitespace) {
                Some(("goto", args)) => {
                    ConsoleCommand::GoTo(parse_goto(args).map_err(|e| e.to_string()))
                }
                _ if line == "goto" => {
                    ConsoleCommand::GoTo(parse_goto("").map_err(|e| e.to_string()))
                }
                _ => ConsoleCommand::Remote(line.to_string()),
            },
        };
        Some(command)
    }

    /// Local commands have no network effect.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ConsoleCommand::Help | ConsoleCommand::About | ConsoleCommand::Clear | ConsoleCommand::Mode
        )
    }
}

/// Parse `"<lat>,<lng>"` (whitespace around either number is ignored).
///
/// # Errors
///
/// [`ArgusError::InputFormat`] unless the text is exactly two finite,
/// comma-separated numbers.
pub fn parse_goto(args: &str) -> Result<LatLng, ArgusError> {
    let parts: Vec<&str> = args.trim().split(',').collect();
    let [lat, lng] = parts.as_slice() else {
        return Err(ArgusError::InputFormat(format!(
            "expected `lat,lng`, got `{}`",
            args.trim()
        )));
    };

    let parse = |s: &str| -> Result<f64, ArgusError> {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ArgusError::InputFormat(format!("`{}` is not a coordinate", s.trim())))
    };
    Ok(LatLng::new(parse(*lat)?, parse(*lng)?))
}

impl<S: Surfaces> Session<S> {
    /// Handle one line of operator input.
    pub fn handle_input(&mut self, line: &str) {
        let Some(command) = ConsoleCommand::parse(line) else {
            return;
        };
        let line = line.trim();
        self.surfaces.print(&format!("{PROMPT} {line}"));

        if !command.is_local() {
            match self.send_command(line) {
                Ok(()) => debug!(command = line, "command forwarded"),
                Err(_) => self.surfaces.print(NOT_CONNECTED),
            }
        }

        match command {
            ConsoleCommand::Help => {
                for entry in HELP {
                    self.surfaces.print(entry);
                }
            }
            ConsoleCommand::About => {
                self.surfaces.print(&format!(
                    "Industrial Inspection Bot v{}",
                    env!("CARGO_PKG_VERSION")
                ));
            }
            ConsoleCommand::Clear => self.surfaces.clear(),
            ConsoleCommand::Mode => {
                self.surfaces
                    .print(&format!("Current control mode: {}", self.mode));
            }
            ConsoleCommand::GoTo(Ok(target)) => self.start_route(target, ActionKind::GoTo),
            ConsoleCommand::GoTo(Err(reason)) => {
                info!(%reason, "rejected goto");
                self.surfaces.print(GOTO_USAGE);
            }
            ConsoleCommand::Remote(_) => {}
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
