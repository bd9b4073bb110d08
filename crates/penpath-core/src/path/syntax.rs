//! Path text codec.
//!
//! The accepted language is the absolute subset `M x y`, `L x y`,
//! `C x1 y1 x2 y2 x y` and `Z`. Parsing is lenient inside a command (junk is
//! dropped, short commands are skipped) but a text that yields no command at
//! all is rejected.

use super::Command;
use thiserror::Error;

/// Path text that could not be turned into any command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no valid path commands in {text:?}")]
    NoValidCommands { text: String },
}

impl ParseError {
    /// The rejected input, for display next to the edit field.
    pub fn text(&self) -> &str {
        match self {
            ParseError::NoValidCommands { text } => text,
        }
    }
}

/// Format a coordinate for path text.
///
/// `f64`'s `Display` is the shortest representation that parses back to the
/// same value and never uses exponent notation.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    value.to_string()
}

/// Serialize commands to path text.
pub fn serialize(commands: &[Command]) -> String {
    commands
        .iter()
        .map(|cmd| match *cmd {
            Command::MoveTo { x, y } => format!("M {} {}", format_number(x), format_number(y)),
            Command::LineTo { x, y } => format!("L {} {}", format_number(x), format_number(y)),
            Command::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => format!(
                "C {} {} {} {} {} {}",
                format_number(x1),
                format_number(y1),
                format_number(x2),
                format_number(y2),
                format_number(x),
                format_number(y)
            ),
            Command::Close => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_command_letter(c: char) -> bool {
    matches!(c, 'M' | 'L' | 'C' | 'Z')
}

/// Split `text` immediately before each command letter.
///
/// Anything before the first letter is not part of any token.
fn tokenize(text: &str) -> Vec<(char, &str)> {
    let starts: Vec<usize> = text
        .char_indices()
        .filter(|&(_, c)| is_command_letter(c))
        .map(|(i, _)| i)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(text.len());
            // Command letters are ASCII, so the body starts one byte later.
            (text.as_bytes()[start] as char, &text[start + 1..end])
        })
        .collect()
}

/// Finite numbers in a token body; anything else is discarded.
fn numbers(body: &str) -> Vec<f64> {
    body.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|piece| !piece.is_empty())
        .filter_map(|piece| piece.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect()
}

fn command_from_token(letter: char, body: &str) -> Option<Command> {
    let n = numbers(body);
    match letter {
        'M' if n.len() >= 2 => Some(Command::move_to(n[0], n[1])),
        'L' if n.len() >= 2 => Some(Command::line_to(n[0], n[1])),
        'C' if n.len() >= 6 => Some(Command::curve_to(n[0], n[1], n[2], n[3], n[4], n[5])),
        'Z' => Some(Command::Close),
        _ => {
            log::debug!("Dropping incomplete path command {letter}{body:?}");
            None
        }
    }
}

/// Parse path text into commands.
pub fn parse(text: &str) -> Result<Vec<Command>, ParseError> {
    let commands: Vec<Command> = tokenize(text)
        .into_iter()
        .filter_map(|(letter, body)| command_from_token(letter, body))
        .collect();

    if commands.is_empty() {
        return Err(ParseError::NoValidCommands {
            text: text.to_string(),
        });
    }
    Ok(commands)
}
