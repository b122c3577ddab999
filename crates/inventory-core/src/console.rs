//! The interactive line menu shared by the server and the client.
//!
//! The menu only knows about keywords.  A line starting with `show`, `add` or
//! `update` is handed to a [`CommandSink`] together with the remaining tokens;
//! the sink decides what to do with it (call the service in-process on the
//! server, send it over the wire on the client) and returns the text to print.
//!
//! Lines arrive through [`MenuLines`].  On a terminal they come from a
//! `rustyline` editor on its own thread, which reads a line only when the
//! menu asks for one, so the prompt never lands in the middle of a reply.

use std::io::{self, Write};

use async_trait::async_trait;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::domain::Verb;

/// Printed before every line read.
pub const PROMPT: &str = "'menu' for help > ";

/// Printed on start and for `menu`.
pub const HELP: &str = "\
Available commands:
  show vegetable all                          list every vegetable
  show vegetable <name>                       show one vegetable
  show price <name>                           show the unit price of a vegetable
  show stocks <name>                          show the stock of a vegetable
  add vegetable <name> <unit price> <stocks>  add a new vegetable
  update price <name> <unit price>            change the unit price
  update stocks <name> <stocks>               change the stock
  menu                                        print this help
  exit | quit                                 leave
";

/// Errors that end the menu loop early.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// The sink could not run a command at all (e.g. the server is unreachable).
    #[error("{0}")]
    Sink(String),
}

/// Executes one menu command.
#[async_trait]
pub trait CommandSink: Send {
    /// Runs `verb` with the tokens that followed it and returns the text to show.
    ///
    /// `Err` is reserved for failures that make continuing pointless; a
    /// rejected command is still `Ok` with its message.
    async fn execute(&mut self, verb: Verb, args: &[String]) -> Result<String, String>;
}

/// What one input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuInput {
    Blank,
    Help,
    Exit,
    Command { verb: Verb, args: Vec<String> },
    Unknown(String),
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    /// The user typed `exit` or `quit`.
    Requested,
    /// Input ran out.
    EndOfInput,
}

/// Classifies one line of input by its first token.
pub fn parse_line(line: &str) -> MenuInput {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return MenuInput::Blank;
    };
    match first {
        "menu" => MenuInput::Help,
        "exit" | "quit" => MenuInput::Exit,
        word => match Verb::from_keyword(word) {
            Some(verb) => MenuInput::Command {
                verb,
                args: tokens.map(str::to_string).collect(),
            },
            None => MenuInput::Unknown(word.to_string()),
        },
    }
}

/// Input lines for [`run_menu`].
pub struct MenuLines {
    lines: mpsc::Receiver<String>,
    /// Present for an on-demand reader, which prints its own prompt.
    demand: Option<mpsc::Sender<()>>,
}

impl MenuLines {
    /// Waits for the next line; `None` once input has ended.
    pub async fn recv(&mut self) -> Option<String> {
        if let Some(demand) = &self.demand {
            demand.send(()).await.ok()?;
        }
        self.lines.recv().await
    }

    fn echoes_prompt(&self) -> bool {
        self.demand.is_none()
    }
}

/// Runs the menu until `exit`/`quit` or end of input.
///
/// # Errors
///
/// Returns [`ConsoleError`] if writing to `out` fails or the sink reports a
/// fatal failure.
pub async fn run_menu<W, S>(
    lines: &mut MenuLines,
    out: &mut W,
    sink: &mut S,
) -> Result<MenuExit, ConsoleError>
where
    W: Write + Send,
    S: CommandSink + ?Sized,
{
    out.write_all(HELP.as_bytes())?;
    loop {
        if lines.echoes_prompt() {
            write!(out, "{PROMPT}")?;
        }
        out.flush()?;

        let Some(line) = lines.recv().await else {
            writeln!(out)?;
            return Ok(MenuExit::EndOfInput);
        };

        match parse_line(&line) {
            MenuInput::Blank => {}
            MenuInput::Help => out.write_all(HELP.as_bytes())?,
            MenuInput::Exit => {
                writeln!(out, "Exiting...")?;
                return Ok(MenuExit::Requested);
            }
            MenuInput::Unknown(word) => {
                debug!("unknown menu word: {word}");
                writeln!(out, "Unknown command")?;
            }
            MenuInput::Command { verb, args } => {
                let text = sink.execute(verb, &args).await.map_err(ConsoleError::Sink)?;
                out.write_all(text.as_bytes())?;
            }
        }
    }
}

/// Reads terminal lines with a `rustyline` editor on a dedicated thread.
///
/// The editor prints [`PROMPT`] and keeps an in-memory history.  End of
/// input (Ctrl+D) and Ctrl+C at the prompt both close the channel, so the
/// menu returns [`MenuExit::EndOfInput`].
pub fn spawn_terminal_lines() -> MenuLines {
    let (line_tx, lines) = mpsc::channel(1);
    let (demand, demand_rx) = mpsc::channel(1);

    // On failure the closure and both channel ends it holds are dropped.
    if let Err(e) = std::thread::Builder::new()
        .name("inventory-readline".into())
        .spawn(move || read_terminal(line_tx, demand_rx))
    {
        error!("cannot start the terminal reader: {e}");
    }

    MenuLines {
        lines,
        demand: Some(demand),
    }
}

fn read_terminal(lines: mpsc::Sender<String>, mut demand: mpsc::Receiver<()>) {
    let config = Config::builder().auto_add_history(true).build();
    let mut editor = match DefaultEditor::with_config(config) {
        Ok(editor) => editor,
        Err(e) => {
            error!("cannot open the line editor: {e}");
            return;
        }
    };

    while demand.blocking_recv().is_some() {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if lines.blocking_send(line).is_err() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                debug!("Ctrl+C at the prompt");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!("terminal read failed: {e}");
                break;
            }
        }
    }
}

/// Loads `lines` into a closed channel, for driving the menu from a script.
///
/// The menu echoes [`PROMPT`] itself before each scripted line.
pub fn scripted_lines<I, S>(lines: I) -> MenuLines
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
    let (tx, rx) = mpsc::channel(lines.len().max(1));
    for line in lines {
        // Capacity covers every line, so this cannot fail.
        let _ = tx.try_send(line);
    }
    MenuLines {
        lines: rx,
        demand: None,
    }
}
