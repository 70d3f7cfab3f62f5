//! Terminal slider panel: turns operator lines into tuner events.
//!
//! Accepted lines:
//! - `<param> <value>`, e.g. `param2 35` or `dp 12`
//! - `q`, `quit`, `exit`, `esc`, or a bare ESC character to leave
//! - `show` to reprint the current slider values
//! - `help` or `?`
use crate::error::{HoughError, Result};
use crate::params::ParamName;
use crate::tuner::TunerEvent;
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

const ESC: char = '\u{1b}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Set { name: ParamName, value: i32 },
    Show,
    Help,
    Exit,
}

impl Command {
    pub fn into_event(self) -> Option<TunerEvent> {
        match self {
            Command::Set { name, value } => Some(TunerEvent::ParameterChanged { name, value }),
            Command::Show => Some(TunerEvent::ShowParameters),
            Command::Exit => Some(TunerEvent::Exit),
            Command::Help => None,
        }
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim_matches(|c: char| c.is_whitespace() && c != ESC);
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with(ESC) {
        return Ok(Some(Command::Exit));
    }

    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default();
    match head.to_lowercase().as_str() {
        "q" | "quit" | "exit" | "esc" => return Ok(Some(Command::Exit)),
        "help" | "?" => return Ok(Some(Command::Help)),
        "show" | "values" => return Ok(Some(Command::Show)),
        _ => {}
    }

    let name: ParamName = head.parse()?;
    let raw = parts.next().ok_or_else(|| HoughError::InvalidParameter {
        name: name.label(),
        reason: "missing value".to_string(),
    })?;
    let value = raw.parse::<i32>().map_err(|e| HoughError::InvalidParameter {
        name: name.label(),
        reason: format!("{raw:?} is not an integer ({e})"),
    })?;
    if let Some(extra) = parts.next() {
        return Err(HoughError::InvalidParameter {
            name: name.label(),
            reason: format!("unexpected trailing input {extra:?}"),
        });
    }

    Ok(Some(Command::Set { name, value }))
}

/// Usage text listing every slider and its range
pub fn help_text() -> String {
    let mut text = String::from("Commands: <param> <value> | show | help | q (or Esc) to quit\nSliders:\n");
    for name in ParamName::ALL {
        let slider = name.slider();
        text.push_str(&format!("  {:<10} {}..={}\n", name.label(), slider.min, slider.max));
    }
    text.push_str("  (dp is entered x10; maxRadius 0 means no upper bound)\n");
    text
}

/// Forward parsed lines from `input` to `events` until exit or end of input.
///
/// End of input counts as an exit request.
pub fn forward_commands<R: BufRead>(input: R, events: &Sender<TunerEvent>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("stopped reading input: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(Command::Help)) => print!("{}", help_text()),
            Ok(Some(command)) => {
                let Some(event) = command.into_event() else { continue };
                debug!(?event, "operator input");
                if events.send(event).is_err() {
                    return;
                }
                if event == TunerEvent::Exit {
                    return;
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    let _ = events.send(TunerEvent::Exit);
}

/// Read commands from stdin on a background thread
pub fn spawn_stdin_reader(events: Sender<TunerEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        forward_commands(stdin.lock(), &events);
    })
}
