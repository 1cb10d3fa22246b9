mod admin;
mod poll;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::handlers::{AdminScreen, VoteScreen};

pub use admin::show_books;

lazy_static! {
    static ref COMMAND_LINE: Regex =
        Regex::new(r"^\s*([A-Za-z]+)(?:\s+(.*?))?\s*$").expect("command pattern compiles");
}

pub const HELP: &str = "\
Voting:
  poll                 show the current poll
  refresh              reload the poll and its results
  choose <n>           tick or untick option n (up to three)
  reset                clear your choices
  vote                 send your choices
Admin:
  login <user> <pass>  open the admin screen
  logout               close the admin session
  books                list books matching the search
  search [text]        filter books by title
  add <n>              add book n to the new poll
  remove <n>           remove entry n from the new poll
  active on|off        publish the new poll as the active one
  draft                show the new poll
  create               publish the new poll
Other:
  help                 show this text
  quit                 leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Poll,
    Refresh,
    Choose(usize),
    Reset,
    Vote,
    Login { username: String, password: String },
    Logout,
    Books,
    Search(String),
    Add(usize),
    Remove(usize),
    Active(bool),
    Draft,
    Create,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', type 'help' for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

fn position(args: &str, usage: &'static str) -> Result<usize, ParseError> {
    args.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ParseError::Usage(usage))
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    if line.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let caps = COMMAND_LINE
        .captures(line)
        .ok_or_else(|| ParseError::Unknown(line.trim().to_string()))?;
    let verb = caps[1].to_lowercase();
    let args = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    let command = match verb.as_str() {
        "poll" => Command::Poll,
        "refresh" => Command::Refresh,
        "choose" => Command::Choose(position(args, "choose <n>")?),
        "reset" => Command::Reset,
        "vote" => Command::Vote,
        "login" => {
            let mut parts = args.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(username), Some(password), None) => Command::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                _ => return Err(ParseError::Usage("login <user> <pass>")),
            }
        }
        "logout" => Command::Logout,
        "books" => Command::Books,
        "search" => Command::Search(args.to_string()),
        "add" => Command::Add(position(args, "add <n>")?),
        "remove" => Command::Remove(position(args, "remove <n>")?),
        "active" => match args.to_lowercase().as_str() {
            "on" | "yes" | "true" => Command::Active(true),
            "off" | "no" | "false" => Command::Active(false),
            _ => return Err(ParseError::Usage("active on|off")),
        },
        "draft" => Command::Draft,
        "create" => Command::Create,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

/// What a command wants printed, and whether the loop should stop.
#[derive(Debug, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }
}

/// Both screens of the client behind one command interface.
pub struct App {
    pub vote: VoteScreen,
    pub admin: AdminScreen,
}

impl App {
    pub fn new(vote: VoteScreen, admin: AdminScreen) -> Self {
        Self { vote, admin }
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Poll => Reply::lines(poll::show(&self.vote).await),
            Command::Refresh => Reply::lines(poll::refresh(&mut self.vote).await),
            Command::Choose(n) => Reply::lines(poll::choose(&mut self.vote, n).await),
            Command::Reset => Reply::lines(poll::reset(&mut self.vote).await),
            Command::Vote => Reply::lines(poll::vote(&mut self.vote).await),
            Command::Login { username, password } => {
                Reply::lines(admin::login(&mut self.admin, &username, &password).await)
            }
            Command::Logout => Reply::lines(admin::logout(&mut self.admin).await),
            Command::Books => Reply::lines(admin::show_books(&self.admin)),
            Command::Search(text) => Reply::lines(admin::search(&mut self.admin, &text)),
            Command::Add(n) => Reply::lines(admin::add(&mut self.admin, n)),
            Command::Remove(n) => Reply::lines(admin::remove(&mut self.admin, n)),
            Command::Active(on) => Reply::lines(admin::set_active(&mut self.admin, on)),
            Command::Draft => Reply::lines(admin::show_draft(&self.admin)),
            Command::Create => Reply::lines(admin::create(&mut self.admin).await),
            Command::Help => Reply::line(HELP),
            Command::Quit => Reply {
                lines: vec!["Bye.".to_string()],
                quit: true,
            },
        }
    }

    /// Parses and runs one input line.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        match parse(line) {
            Ok(command) => self.execute(command).await,
            Err(ParseError::Empty) => Reply::default(),
            Err(e) => Reply::line(e.to_string()),
        }
    }
}
