//! Text command grammar.
//!
//! The console speaks a small line-oriented grammar:
//!
//! ```text
//! OPEN DOOR
//! ADD USER <ra>,<name>,<uid>
//! REMOVE USER <ra>
//! GET USERS
//! ```
//!
//! Keywords are matched case-insensitively after trimming, and may also be
//! written with an underscore (`ADD_USER`). Argument text keeps its case;
//! each `ADD USER` field is trimmed. `ADD USER` requires exactly two comma
//! separators.
//!
//! Parsing is two steps: a tokenizer splits the keyword from the argument
//! text, then a grammar table maps the keyword to a command kind and the
//! shape of its arguments.
//!
//! # Examples
//!
//! ```
//! use modulock_protocol::{Command, CommandParser};
//!
//! assert_eq!(CommandParser::parse("  open door ").unwrap(), Command::OpenDoor);
//! assert_eq!(
//!     CommandParser::parse("REMOVE_USER R1").unwrap(),
//!     Command::RemoveUser { ra: "R1".to_string() }
//! );
//!
//! // Malformed split is a parse error with a usage hint
//! let error = CommandParser::parse("ADD USER R1,Alice").unwrap_err();
//! assert!(error.to_string().contains("ADD USER RA,NAME,UID"));
//! ```

use crate::commands::Command;
use modulock_core::{
    Error, Result,
    constants::{
        CMD_ADD_USER, CMD_GET_USERS, CMD_OPEN_DOOR, CMD_REMOVE_USER, FIELD_SEPARATOR,
        USAGE_ADD_USER, USAGE_ALL, USAGE_REMOVE_USER,
    },
};

/// Commands that take no arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BareCommand {
    OpenDoor,
    GetUsers,
}

impl BareCommand {
    fn command(self) -> Command {
        match self {
            BareCommand::OpenDoor => Command::OpenDoor,
            BareCommand::GetUsers => Command::GetUsers,
        }
    }
}

/// Shape of a command's argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    /// No arguments allowed.
    Bare(BareCommand),
    /// One free-text argument.
    Single,
    /// Exactly three comma-separated fields.
    Fields3,
}

struct GrammarRule {
    keyword: &'static str,
    arity: Arity,
    usage: &'static str,
}

const GRAMMAR: &[GrammarRule] = &[
    GrammarRule {
        keyword: CMD_OPEN_DOOR,
        arity: Arity::Bare(BareCommand::OpenDoor),
        usage: "Use 'OPEN DOOR'",
    },
    GrammarRule {
        keyword: CMD_ADD_USER,
        arity: Arity::Fields3,
        usage: USAGE_ADD_USER,
    },
    GrammarRule {
        keyword: CMD_REMOVE_USER,
        arity: Arity::Single,
        usage: USAGE_REMOVE_USER,
    },
    GrammarRule {
        keyword: CMD_GET_USERS,
        arity: Arity::Bare(BareCommand::GetUsers),
        usage: "Use 'GET USERS'",
    },
];

/// Parser for text commands.
pub struct CommandParser;

impl CommandParser {
    /// Parse one command line.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the line is empty, the keyword is unknown
    /// (the hint lists every command), or the arguments do not match the
    /// command's shape (the hint shows that command's usage).
    pub fn parse(input: &str) -> Result<Command> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::parse("empty command", USAGE_ALL));
        }

        let (keyword, args) = split_keyword(input);
        let Some(rule) = GRAMMAR.iter().find(|rule| rule.keyword == keyword) else {
            return Err(Error::parse(format!("unknown command '{keyword}'"), USAGE_ALL));
        };

        let args = args.trim();
        match rule.arity {
            Arity::Bare(_) if !args.is_empty() => Err(Error::parse(
                format!("{} takes no arguments", rule.keyword),
                rule.usage,
            )),
            Arity::Bare(bare) => Ok(bare.command()),
            Arity::Single if args.is_empty() => Err(Error::parse(
                format!("{} requires an argument", rule.keyword),
                rule.usage,
            )),
            Arity::Single => Ok(Command::RemoveUser {
                ra: args.to_string(),
            }),
            Arity::Fields3 => {
                let fields: Vec<&str> = args.split(FIELD_SEPARATOR).map(str::trim).collect();
                let [ra, name, uid] = fields.as_slice() else {
                    return Err(Error::parse(
                        format!(
                            "{} expects 3 comma-separated fields, got {}",
                            rule.keyword,
                            fields.len()
                        ),
                        rule.usage,
                    ));
                };
                Ok(Command::AddUser {
                    ra: ra.to_string(),
                    name: name.to_string(),
                    uid: uid.to_string(),
                })
            }
        }
    }
}

/// Split the leading keyword from the argument text.
///
/// The keyword is either one underscore-joined word (`ADD_USER`) or the
/// first two whitespace-separated words (`ADD USER`), uppercased and
/// normalized to the space-separated form.
fn split_keyword(input: &str) -> (String, &str) {
    let (first, rest) = next_word(input);
    if first.contains('_') {
        return (first.replace('_', " ").to_ascii_uppercase(), rest);
    }

    let (second, after) = next_word(rest);
    if second.is_empty() {
        return (first.to_ascii_uppercase(), after);
    }
    (
        format!("{} {}", first.to_ascii_uppercase(), second.to_ascii_uppercase()),
        after,
    )
}

fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], &input[end..]),
        None => (input, ""),
    }
}
