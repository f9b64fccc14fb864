use anyhow::{anyhow, bail, Result};
use civic_core::{Filter, Session, Severity, SortKey, Status};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::render;

const PROMPT: &str = "fixmytown> ";

const HELP: &str = "\
Commands:
  tab <unresolved|in-progress|resolved>   switch status tab
  category <name|all>                     filter by category
  severity <Low|Medium|High|all>          filter by severity
  search [text]                           search title, id and category (empty clears)
  sort <date|severity|upvotes>            change sort order
  list                                    show the current view
  show <id>                               open an issue in the detail view
  status <status>                         change the status of the open issue
  set <id> <status>                       change the status of any issue
  close                                   close the detail view
  reset                                   clear category, severity and search filters
  help                                    this text
  quit                                    leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Tab(Status),
    Category(Filter<String>),
    Severity(Filter<Severity>),
    Search(String),
    Sort(SortKey),
    List,
    Show(String),
    Status(Status),
    Set(String, Status),
    Close,
    Reset,
    Help,
    Quit,
}

/// `None` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (trimmed, ""),
    };
    let argument = rest.trim();

    let command = match verb.to_ascii_lowercase().as_str() {
        "tab" => ShellCommand::Tab(required(argument, "tab")?.parse()?),
        "category" => ShellCommand::Category(required(argument, "category")?.parse()?),
        "severity" => ShellCommand::Severity(required(argument, "severity")?.parse()?),
        // search text is taken verbatim, surrounding spaces included
        "search" => ShellCommand::Search(rest.to_string()),
        "sort" => ShellCommand::Sort(required(argument, "sort")?.parse()?),
        "list" | "ls" => ShellCommand::List,
        "show" | "open" => ShellCommand::Show(required(argument, "show")?.to_string()),
        "status" => ShellCommand::Status(required(argument, "status")?.parse()?),
        "set" => {
            let (id, status) = required(argument, "set")?
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: set <id> <status>"))?;
            ShellCommand::Set(id.to_string(), status.trim().parse()?)
        }
        "close" => ShellCommand::Close,
        "reset" => ShellCommand::Reset,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => bail!("unknown command `{other}` (try `help`)"),
    };
    Ok(Some(command))
}

fn required<'a>(argument: &'a str, verb: &str) -> Result<&'a str> {
    if argument.is_empty() {
        bail!("`{verb}` needs an argument (try `help`)");
    }
    Ok(argument)
}

/// Runs until `quit` or end of input. Bad commands are reported and skipped.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    out: &mut W,
    color: bool,
) -> Result<()> {
    write!(out, "{}", render::issue_table(&session.visible(), color))?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => {
                debug!(?command, "shell command");
                apply(session, command, out, color)?;
            }
            Err(error) => writeln!(out, "error: {error}")?,
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

fn apply<W: Write>(
    session: &mut Session,
    command: ShellCommand,
    out: &mut W,
    color: bool,
) -> Result<()> {
    match command {
        ShellCommand::Tab(status) => {
            session.set_tab(status);
            print_view(session, out, color)?;
        }
        ShellCommand::Category(category) => {
            session.set_category(category);
            print_view(session, out, color)?;
        }
        ShellCommand::Severity(severity) => {
            session.set_severity(severity);
            print_view(session, out, color)?;
        }
        ShellCommand::Search(text) => {
            session.set_search(text);
            print_view(session, out, color)?;
        }
        ShellCommand::Sort(key) => {
            session.set_sort(key);
            print_view(session, out, color)?;
        }
        ShellCommand::Reset => {
            session.reset_filters();
            print_view(session, out, color)?;
        }
        ShellCommand::List => print_view(session, out, color)?,
        ShellCommand::Show(id) => match session.select(&id) {
            Some(issue) => write!(out, "{}", render::issue_detail(issue, color))?,
            None => writeln!(out, "no issue with id `{id}`")?,
        },
        ShellCommand::Status(status) => match session.update_selected_status(status) {
            Some(issue) => write!(out, "{}", render::issue_detail(issue, color))?,
            None => writeln!(out, "no issue open; use `show <id>` first")?,
        },
        ShellCommand::Set(id, status) => {
            if session.set_status(&id, status) {
                writeln!(out, "{id} -> {status}")?;
            } else {
                writeln!(out, "no issue with id `{id}`; nothing changed")?;
            }
        }
        ShellCommand::Close => session.close(),
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn print_view<W: Write>(session: &Session, out: &mut W, color: bool) -> Result<()> {
    let config = session.config();
    writeln!(
        out,
        "[{}] category={} severity={} search={:?} sort={}",
        config.status_tab, config.category, config.severity, config.search_text, config.sort_key
    )?;
    write!(out, "{}", render::issue_table(&session.visible(), color))?;
    Ok(())
}
