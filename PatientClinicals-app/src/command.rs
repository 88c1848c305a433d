//! Line commands understood by the shell

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}. Type 'help' for the list of commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a valid id: {0}")]
    InvalidId(String),
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the screen at a path
    Go(String),
    /// Fetch the current screen's data again
    Reload,
    /// Set a form field of the current screen
    Set { field: String, value: String },
    Clear,
    Submit,
    /// Delete a patient from the list
    Delete(i64),
    /// Open the clinical screen of a patient
    Clinical(i64),
    /// Open the add-patient form
    Add,
    /// Back to the patient list
    Home,
    /// Dismiss one notification, or all of them
    Dismiss(Option<u64>),
    /// Resolve a pending confirmation
    Answer { id: u64, accepted: bool },
    Help,
    Quit,
    /// Blank line; just re-render
    Empty,
}

pub const HELP: &str = "\
Commands:
  go <path>              open /, /add-patient or /add-clinical/<id>
  reload                 fetch the current screen again
  set <field> <value>    fill a form field (firstName, lastName, age, component, value)
  clear                  empty the form
  submit                 save the form
  delete <id>            delete a patient (asks for confirmation)
  clinical <id>          record clinical data for a patient
  add                    register a new patient
  home                   back to the patient list
  dismiss [id]           close one notification, or all
  answer <id> y|n        resolve a pending confirmation
  help                   show this help
  quit                   exit";

fn parse_id<T: FromStr>(raw: Option<&str>, usage: &'static str) -> Result<T, CommandError> {
    let raw = raw.ok_or(CommandError::Usage(usage))?;
    raw.parse::<T>()
        .map_err(|_| CommandError::InvalidId(raw.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let arg = Some(rest).filter(|rest| !rest.is_empty());

        match verb.to_ascii_lowercase().as_str() {
            "" => Ok(Command::Empty),
            "go" | "open" => arg
                .map(|path| Command::Go(path.to_string()))
                .ok_or(CommandError::Usage("go <path>")),
            "reload" | "refresh" => Ok(Command::Reload),
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(field, value)| (field, value.trim()))
                    .unwrap_or((rest, ""));
                if field.is_empty() {
                    return Err(CommandError::Usage("set <field> <value>"));
                }
                Ok(Command::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            }
            "clear" => Ok(Command::Clear),
            "submit" | "save" => Ok(Command::Submit),
            "delete" | "rm" => parse_id(arg, "delete <id>").map(Command::Delete),
            "clinical" => parse_id(arg, "clinical <id>").map(Command::Clinical),
            "add" => Ok(Command::Add),
            "home" | "back" => Ok(Command::Home),
            "dismiss" => match arg {
                Some(raw) => parse_id(Some(raw), "dismiss [id]").map(|id| Command::Dismiss(Some(id))),
                None => Ok(Command::Dismiss(None)),
            },
            "answer" => {
                let mut parts = rest.split_whitespace();
                let id = parse_id(parts.next(), "answer <id> y|n")?;
                let accepted = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("y") | Some("yes") => true,
                    Some("n") | Some("no") => false,
                    _ => return Err(CommandError::Usage("answer <id> y|n")),
                };
                Ok(Command::Answer { id, accepted })
            }
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Whether a confirmation answer means yes
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
