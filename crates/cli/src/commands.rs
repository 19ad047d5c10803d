//! Interactive command parsing.
//!
//! One command per input line:
//!
//! | Command                    | Action                                   |
//! |----------------------------|------------------------------------------|
//! | `submit field=value ...`   | Submit a new brief                       |
//! | `status`                   | Check the tracked job's status now       |
//! | `copy <n>`                 | Copy fragment `n` (1-based) to clipboard |
//! | `dismiss`                  | Hide the visible error notice            |
//! | `help`                     | Show usage                               |
//! | `quit` / `exit`            | Leave                                    |
//!
//! Values containing spaces can be quoted: `submit topic="red shoes"`.

use briefcast_core::{CoreError, RawForm};

pub const USAGE: &str = "\
Commands:
  submit field=value ...   submit a brief (fields: topic, duration, tonality,
                           target_audience, additional_context, platforms)
  status                   check the job status now
  copy <n>                 copy result section n to the clipboard
  dismiss                  hide the current error
  help                     show this help
  quit                     exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(RawForm),
    Status,
    /// Zero-based fragment index.
    Copy(usize),
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid section number '{0}'")]
    InvalidIndex(String),

    #[error("Unterminated quote")]
    UnterminatedQuote,

    #[error(transparent)]
    Form(#[from] CoreError),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let words = split_words(line)?;
    let Some((name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "submit" => Command::Submit(RawForm::from_pairs(args)?),
        "status" => Command::Status,
        "copy" => {
            let raw = args.first().ok_or(CommandError::MissingArgument("section number"))?;
            Command::Copy(parse_index(raw)?)
        }
        "dismiss" => Command::Dismiss,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// 1-based section number to zero-based index.
fn parse_index(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::InvalidIndex(raw.to_string())),
    }
}

/// Split on whitespace, honouring single and double quotes anywhere in
/// a word (`topic="red shoes"` is one word: `topic=red shoes`).
pub fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
