//! Command parsing and validation.
//!
//! A user types something like `add vegetable carrot 2.50 100`.  Turning that
//! into work happens in two stages:
//!
//! ```text
//! tokens ──Command::parse──▶ Command ──Command::validate──▶ Operation
//!          (keywords only)   (on the wire)   (arity + combination)
//! ```
//!
//! 1. [`Command::parse`] only recognises keywords: the verb and the target.
//!    Whatever follows is kept as `args`.  The result is what travels over the
//!    network, on every binding.
//! 2. [`Command::validate`] checks that the verb/target pair exists and that
//!    the argument count is right, and produces an [`Operation`]: a tagged
//!    variant the server matches on exhaustively.
//!
//! The server always runs stage 2 itself, because a JSON-RPC peer can put any
//! `Command` it likes on the wire.
//!
//! # Grammar
//!
//! | Input                                   | Operation   |
//! |-----------------------------------------|-------------|
//! | `show vegetable all`                    | `ShowAll`   |
//! | `show vegetable <name>`                 | `ShowOne`   |
//! | `show price <name>`                     | `ShowField` |
//! | `show stocks <name>`                    | `ShowField` |
//! | `add vegetable <name> <price> <stock>`  | `Add`       |
//! | `update price <name> <value>`           | `Update`    |
//! | `update stocks <name> <value>`          | `Update`    |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::CommandError;
use crate::domain::record::{Field, InventoryRecord};

/// The three operation families.  Each maps to one remote method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Show,
    Add,
    Update,
}

impl Verb {
    /// Recognises a verb keyword typed at the menu.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "show" => Some(Verb::Show),
            "add" => Some(Verb::Add),
            "update" => Some(Verb::Update),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Verb::Show => "show",
            Verb::Add => "add",
            Verb::Update => "update",
        }
    }
}

/// What a command acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// A whole record, addressed by name.
    Vegetable,
    /// The `unit_price` field of a record.
    Price,
    /// The `stock_kg` field of a record.
    Stocks,
    /// Every record (`show vegetable all`).
    All,
}

impl Target {
    /// The keyword(s) that select this target on the command line.
    pub fn keyword(self) -> &'static str {
        match self {
            Target::Vegetable => "vegetable",
            Target::Price => "price",
            Target::Stocks => "stocks",
            Target::All => "vegetable all",
        }
    }

    fn field(self) -> Option<Field> {
        match self {
            Target::Price => Some(Field::UnitPrice),
            Target::Stocks => Some(Field::StockKg),
            Target::Vegetable | Target::All => None,
        }
    }
}

/// A parsed request: verb, target and the remaining positional arguments.
///
/// Immutable once built.  This is the parameter of every remote method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub verb: Verb,
    pub target: Target,
    pub args: Vec<String>,
}

/// A validated command, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ShowAll,
    ShowOne { name: String },
    ShowField { name: String, field: Field },
    Add(InventoryRecord),
    Update { name: String, field: Field, value: String },
}

impl Operation {
    /// Returns `true` for operations that change the collection.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Operation::Add(_) | Operation::Update { .. })
    }
}

impl Command {
    pub fn new(verb: Verb, target: Target, args: Vec<String>) -> Self {
        Self { verb, target, args }
    }

    /// Recognises the target keyword that follows `verb`.
    ///
    /// `tokens` excludes the verb itself.  No arity checks happen here.
    ///
    /// # Errors
    ///
    /// [`CommandError::MissingTarget`] when `tokens` is empty and
    /// [`CommandError::UnknownCommand`] when the first token is not a target
    /// keyword.
    pub fn parse<S: AsRef<str>>(verb: Verb, tokens: &[S]) -> Result<Self, CommandError> {
        let (first, rest) = tokens.split_first().ok_or(CommandError::MissingTarget)?;
        let rest: Vec<String> = rest.iter().map(|s| s.as_ref().to_string()).collect();

        let (target, args) = match first.as_ref() {
            "vegetable" if verb == Verb::Show && rest.first().map(String::as_str) == Some("all") => {
                (Target::All, rest[1..].to_vec())
            }
            "vegetable" => (Target::Vegetable, rest),
            "price" => (Target::Price, rest),
            "stocks" => (Target::Stocks, rest),
            _ => {
                let mut words = vec![verb.keyword().to_string(), first.as_ref().to_string()];
                words.extend(rest);
                return Err(CommandError::UnknownCommand(words.join(" ")));
            }
        };

        Ok(Self { verb, target, args })
    }

    /// Parses a full token line whose first token is the verb.
    ///
    /// # Errors
    ///
    /// As [`Command::parse`], plus [`CommandError::UnknownCommand`] for an
    /// unknown verb and [`CommandError::MissingTarget`] for an empty line.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, CommandError> {
        let (verb_word, rest) = tokens.split_first().ok_or(CommandError::MissingTarget)?;
        let verb = Verb::from_keyword(verb_word.as_ref()).ok_or_else(|| {
            CommandError::UnknownCommand(
                tokens.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join(" "),
            )
        })?;
        Self::parse(verb, rest)
    }

    /// Checks the verb/target combination and the argument count.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownCommand`] for a combination that does not exist
    /// (for example `add price`), [`CommandError::InvalidArity`] for a wrong
    /// argument count and [`CommandError::EmptyName`] for `add` with an empty
    /// name.
    pub fn validate(&self) -> Result<Operation, CommandError> {
        match (self.verb, self.target) {
            (Verb::Show, Target::All) => {
                self.expect_args::<0>()?;
                Ok(Operation::ShowAll)
            }
            (Verb::Show, Target::Vegetable) => {
                let [name] = self.expect_args::<1>()?;
                Ok(Operation::ShowOne { name })
            }
            (Verb::Show, Target::Price | Target::Stocks) => {
                let [name] = self.expect_args::<1>()?;
                let field = self.target.field().ok_or_else(|| self.unknown())?;
                Ok(Operation::ShowField { name, field })
            }
            (Verb::Add, Target::Vegetable) => {
                let [name, unit_price, stock_kg] = self.expect_args::<3>()?;
                if name.is_empty() {
                    return Err(CommandError::EmptyName);
                }
                Ok(Operation::Add(InventoryRecord {
                    name,
                    unit_price,
                    stock_kg,
                }))
            }
            (Verb::Update, Target::Price | Target::Stocks) => {
                let [name, value] = self.expect_args::<2>()?;
                let field = self.target.field().ok_or_else(|| self.unknown())?;
                Ok(Operation::Update { name, field, value })
            }
            _ => Err(self.unknown()),
        }
    }

    /// Rebuilds the token line this command was parsed from.
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = vec![self.verb.keyword().to_string()];
        tokens.extend(self.target.keyword().split(' ').map(str::to_string));
        tokens.extend(self.args.iter().cloned());
        tokens
    }

    /// `"<verb> <target>"`, as used in arity error messages.
    fn label(&self) -> String {
        format!("{} {}", self.verb.keyword(), self.target.keyword())
    }

    fn unknown(&self) -> CommandError {
        CommandError::UnknownCommand(self.to_tokens().join(" "))
    }

    fn expect_args<const N: usize>(&self) -> Result<[String; N], CommandError> {
        <[String; N]>::try_from(self.args.clone())
            .map_err(|_| CommandError::InvalidArity(self.label()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tokens().join(" "))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
