//! Line-oriented driver for one management screen.
//!
//! Each input line parses into a [`ConsoleCommand`], which [`apply`] runs
//! against a [`ScreenTable`]. Mutating commands answer with the redrawn page.

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::output::{render_fields, render_form, render_text};
use crate::screens::{ScreenError, ScreenTable};
use crate::table::paginator::PageSize;
use crate::table::view::Confirm;
use crate::table::RecordId;
use crate::utils::{parse_assignment, split_words};

pub const COMMANDS: &[&str] = &[
    "show", "filter", "clear", "page", "next", "prev", "size", "sort", "view", "add", "edit",
    "set", "submit", "cancel", "delete", "toggle", "help", "quit",
];

pub const HELP: &str = "\
show                 redraw the current page
filter <text>        filter on the screen's filter field (empty clears)
clear                clear the filter
page <n>             go to page n
next | prev          move one page
size <n>             page size: 5, 10, 20, 50, 100, 150 or 200
sort <column>        sort by column; repeat to reverse
view <id>            show one record
add | edit <id>      open the form
set <field>=<value>  fill form fields (quote values with spaces)
submit | cancel      close the form
delete <id>          delete after confirmation
toggle <id>          flip the paid status
help | quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Show,
    Filter(String),
    Clear,
    Page(usize),
    Next,
    Prev,
    Size(PageSize),
    Sort(String),
    View(RecordId),
    Add,
    Edit(RecordId),
    Set(Vec<(String, String)>),
    Submit,
    Cancel,
    Delete(RecordId),
    Toggle(RecordId),
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(args: &[String], what: &str) -> Result<T, String> {
    let raw = args
        .first()
        .ok_or_else(|| format!("missing {what}"))?;
    raw.parse()
        .map_err(|_| format!("'{raw}' is not a valid {what}"))
}

impl ConsoleCommand {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let words = split_words(line)?;
        let Some((head, args)) = words.split_first() else {
            return Ok(None);
        };
        let command = match head.to_lowercase().as_str() {
            "show" | "ls" => Self::Show,
            "filter" => Self::Filter(args.join(" ")),
            "clear" => Self::Clear,
            "page" => Self::Page(number(args, "page number")?),
            "next" | "n" => Self::Next,
            "prev" | "previous" | "p" => Self::Prev,
            "size" => {
                let raw = args.first().ok_or_else(|| "missing page size".to_string())?;
                Self::Size(PageSize::parse(raw).map_err(|e| e.to_string())?)
            }
            "sort" => Self::Sort(
                args.first()
                    .cloned()
                    .ok_or_else(|| "missing column".to_string())?,
            ),
            "view" => Self::View(number(args, "record id")?),
            "add" => Self::Add,
            "edit" => Self::Edit(number(args, "record id")?),
            "set" => {
                if args.is_empty() {
                    return Err("expected FIELD=VALUE".to_string());
                }
                Self::Set(
                    args.iter()
                        .map(|a| parse_assignment(a))
                        .collect::<Result<_, _>>()?,
                )
            }
            "submit" | "save" => Self::Submit,
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(number(args, "record id")?),
            "toggle" => Self::Toggle(number(args, "record id")?),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

fn page(table: &dyn ScreenTable, color: bool) -> Reply {
    Reply::Output(render_text(&table.render(), color))
}

fn form(table: &dyn ScreenTable) -> Reply {
    match table.open_form() {
        Some(form) => Reply::Output(render_form(&form)),
        None => Reply::Output(String::new()),
    }
}

pub fn apply(
    table: &mut dyn ScreenTable,
    command: ConsoleCommand,
    confirm: &mut dyn Confirm,
    color: bool,
) -> Result<Reply, ScreenError> {
    let reply = match command {
        ConsoleCommand::Show => page(&*table, color),
        ConsoleCommand::Filter(text) => {
            table.set_filter(&text);
            page(&*table, color)
        }
        ConsoleCommand::Clear => {
            table.set_filter("");
            page(&*table, color)
        }
        ConsoleCommand::Page(n) => {
            table.go_to_page(n)?;
            page(&*table, color)
        }
        ConsoleCommand::Next => {
            table.next_page()?;
            page(&*table, color)
        }
        ConsoleCommand::Prev => {
            table.previous_page()?;
            page(&*table, color)
        }
        ConsoleCommand::Size(size) => {
            table.set_page_size(size);
            page(&*table, color)
        }
        ConsoleCommand::Sort(column) => {
            table.sort_by(&column)?;
            page(&*table, color)
        }
        ConsoleCommand::View(id) => {
            let fields = table.view(id)?;
            Reply::Output(render_fields(&format!("Record {id}"), &fields))
        }
        ConsoleCommand::Add => {
            table.open_add()?;
            form(&*table)
        }
        ConsoleCommand::Edit(id) => {
            table.open_edit(id)?;
            form(&*table)
        }
        ConsoleCommand::Set(assignments) => {
            table.set_fields(&assignments)?;
            form(&*table)
        }
        ConsoleCommand::Submit => {
            let id = table.submit()?;
            Reply::Output(format!(
                "saved record {id}\n{}",
                render_text(&table.render(), color)
            ))
        }
        ConsoleCommand::Cancel => {
            table.cancel();
            page(&*table, color)
        }
        ConsoleCommand::Delete(id) => {
            if table.delete(id, confirm)? {
                Reply::Output(format!(
                    "deleted record {id}\n{}",
                    render_text(&table.render(), color)
                ))
            } else {
                Reply::Output("delete cancelled".to_string())
            }
        }
        ConsoleCommand::Toggle(id) => {
            let status = if table.toggle(id)? { "paid" } else { "unpaid" };
            Reply::Output(format!(
                "record {id} marked {status}\n{}",
                render_text(&table.render(), color)
            ))
        }
        ConsoleCommand::Help => Reply::Output(HELP.to_string()),
        ConsoleCommand::Quit => Reply::Quit,
    };
    Ok(reply)
}

/// Completes command names at the start of the line.
#[derive(Default)]
pub struct ConsoleHelper;

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let before = &line[..pos];
        if before.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let prefix = before.to_lowercase();
        let matches = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: format!("{cmd} "),
            })
            .collect();
        Ok((0, matches))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;
}

impl Highlighter for ConsoleHelper {}

impl Validator for ConsoleHelper {}

impl Helper for ConsoleHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::Screen;

    fn run(table: &mut dyn ScreenTable, line: &str) -> Result<Reply, ScreenError> {
        let command = ConsoleCommand::parse(line).unwrap().unwrap();
        apply(table, command, &mut |_: &str| true, false)
    }

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
        assert_eq!(
            ConsoleCommand::parse("filter hostel a").unwrap(),
            Some(ConsoleCommand::Filter("hostel a".into()))
        );
        assert_eq!(
            ConsoleCommand::parse("set hostelName=\"Hostel Z\" isActive=no").unwrap(),
            Some(ConsoleCommand::Set(vec![
                ("hostelName".into(), "Hostel Z".into()),
                ("isActive".into(), "no".into()),
            ]))
        );
        assert_eq!(
            ConsoleCommand::parse("size 20").unwrap(),
            Some(ConsoleCommand::Size(PageSize::new(20).unwrap()))
        );
        assert!(ConsoleCommand::parse("size 7").is_err());
        assert!(ConsoleCommand::parse("size abc")
            .unwrap_err()
            .contains("'abc' is not a number"));
        assert!(ConsoleCommand::parse("page x").is_err());
        assert!(ConsoleCommand::parse("fly").is_err());
    }

    #[test]
    fn add_flow_through_console() {
        let mut table = Screen::Hostels.open();
        run(table.as_mut(), "add").unwrap();
        run(table.as_mut(), "set hostelName=\"Hostel Z\"").unwrap();
        let reply = run(table.as_mut(), "submit").unwrap();
        assert!(matches!(reply, Reply::Output(text) if text.starts_with("saved record 11")));
        assert_eq!(table.render().total, 11);
    }

    #[test]
    fn set_with_one_bad_value_leaves_draft_alone() {
        let mut table = Screen::Hostels.open();
        run(table.as_mut(), "add").unwrap();
        let err = run(table.as_mut(), "set hostelName=Annex isActive=perhaps").unwrap_err();
        assert!(err.to_string().contains("perhaps"));
        let form = table.open_form().unwrap();
        assert_eq!(form.draft.text("hostelName"), "");
        assert!(!form.draft.flag("isActive"));
    }

    #[test]
    fn disabled_previous_is_an_error() {
        let mut table = Screen::Rooms.open();
        assert!(run(table.as_mut(), "prev").is_err());
        assert!(run(table.as_mut(), "next").is_ok());
        assert_eq!(table.render().page, 2);
    }

    #[test]
    fn declined_delete_keeps_record() {
        let mut table = Screen::Hostels.open();
        let command = ConsoleCommand::parse("delete 3").unwrap().unwrap();
        let reply = apply(table.as_mut(), command, &mut |_: &str| false, false).unwrap();
        assert_eq!(reply, Reply::Output("delete cancelled".into()));
        assert_eq!(table.render().total, 10);
    }

    #[test]
    fn quit_ends_the_loop() {
        let mut table = Screen::Floors.open();
        assert_eq!(run(table.as_mut(), "exit").unwrap(), Reply::Quit);
    }
}
