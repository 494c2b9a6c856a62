// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use hkhub_app::{Client, ClientBook, HousekeepingDetails, parse_date};
use hkhub_storage::JsonClientBookStorage;
use time::Date;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Due { on_or_before: Date },
    Add { name: String, details: Option<String> },
    Set { name: String, details: String },
    Done { name: String, date: Date },
    Remove { name: String },
    Show { name: String },
    Parse { details: String },
}

impl Command {
    /// `args[0]` is the command word. Trailing words of a details argument
    /// are joined with single spaces so `set Ada 2023-06-01 3 months` works
    /// unquoted.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let words = args.iter().map(|arg| arg.as_ref()).collect::<Vec<_>>();
        let Some((&word, rest)) = words.split_first() else {
            bail!("missing command; run with --help to see supported commands");
        };

        let command = match word {
            "list" => {
                expect_arity(word, rest, 0)?;
                Self::List
            }
            "due" => {
                expect_arity(word, rest, 1)?;
                Self::Due {
                    on_or_before: parse_date_arg(rest[0])?,
                }
            }
            "add" => {
                let (name, details) = split_name(word, rest)?;
                Self::Add {
                    name,
                    details: (!details.is_empty()).then_some(details),
                }
            }
            "set" => {
                let (name, details) = split_name(word, rest)?;
                if details.is_empty() {
                    bail!("set requires housekeeping details after the client name");
                }
                Self::Set { name, details }
            }
            "done" => {
                expect_arity(word, rest, 2)?;
                Self::Done {
                    name: rest[0].to_owned(),
                    date: parse_date_arg(rest[1])?,
                }
            }
            "remove" => {
                expect_arity(word, rest, 1)?;
                Self::Remove {
                    name: rest[0].to_owned(),
                }
            }
            "show" => {
                expect_arity(word, rest, 1)?;
                Self::Show {
                    name: rest[0].to_owned(),
                }
            }
            "parse" => {
                if rest.is_empty() {
                    bail!("parse requires housekeeping details");
                }
                Self::Parse {
                    details: rest.join(" "),
                }
            }
            unknown => {
                bail!("unknown command {unknown:?}; run with --help to see supported commands")
            }
        };
        Ok(command)
    }

    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Set { .. } | Self::Done { .. } | Self::Remove { .. }
        )
    }
}

/// Accepts the user form first and falls back to the storage form, which is
/// the only way to enter a multi-unit interval.
pub fn parse_details_input(raw: &str) -> Result<HousekeepingDetails> {
    match HousekeepingDetails::parse_user(raw) {
        Ok(details) => Ok(details),
        Err(user_error) => HousekeepingDetails::parse_storage(raw)
            .map_err(|_| anyhow!(user_error))
            .with_context(|| format!("invalid housekeeping details {raw:?}")),
    }
}

pub fn execute(command: &Command, storage: &JsonClientBookStorage) -> Result<String> {
    // Parsing is a dry run and never reads the book.
    if let Command::Parse { details } = command {
        return render_parsed(details);
    }

    let mut book = storage.read_or_default()?;
    let output = match command {
        Command::List => render_rows(book.by_next_due()),
        Command::Due { on_or_before } => render_rows(book.due_on_or_before(*on_or_before)),
        Command::Add { name, details } => {
            let details = details.as_deref().map(parse_details_input).transpose()?;
            let client = Client::new(name, details);
            let summary = format!("added {}", describe(&client));
            book.add(client)?;
            summary
        }
        Command::Set { name, details } => {
            let details = parse_details_input(details)?;
            book.set_details(name, Some(details))?;
            format!("updated {}", describe_named(&book, name)?)
        }
        Command::Done { name, date } => {
            book.mark_serviced(name, *date)?;
            format!("serviced {}", describe_named(&book, name)?)
        }
        Command::Remove { name } => {
            let removed = book.remove(name)?;
            format!("removed {}", removed.name)
        }
        Command::Show { name } => {
            let client = book
                .get(name)
                .ok_or_else(|| anyhow!("no client named {:?}", name.trim()))?;
            render_client(client)
        }
        Command::Parse { details } => render_parsed(details)?,
    };

    if command.mutates() {
        storage.save(&book)?;
        info!(path = %storage.path().display(), clients = book.len(), "client book updated");
    }
    Ok(output)
}

fn render_parsed(raw: &str) -> Result<String> {
    let details = parse_details_input(raw)?;
    Ok(format!(
        "{details}\nNext housekeeping date: {}",
        details.next_due_date()
    ))
}

fn render_rows(clients: Vec<&Client>) -> String {
    if clients.is_empty() {
        return "no clients".to_owned();
    }
    clients
        .into_iter()
        .map(|client| {
            let due = client
                .next_due_date()
                .map_or_else(|| "-".to_owned(), |date| date.to_string());
            let details = client
                .details
                .as_ref()
                .map_or_else(String::new, ToString::to_string);
            format!("{:<24} {:<10} {}", client.name, due, details)
                .trim_end()
                .to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_client(client: &Client) -> String {
    let stored = client.details.as_ref().map(ToString::to_string);
    let mut out = format!(
        "{}\n{}",
        client.name,
        HousekeepingDetails::render_human_readable(stored.as_deref())
    );
    if let Some(due) = client.next_due_date() {
        out.push_str(&format!("\nNext housekeeping date: {due}"));
    }
    out
}

fn describe(client: &Client) -> String {
    match client.next_due_date() {
        Some(due) => format!("{} (next housekeeping {due})", client.name),
        None => client.name.clone(),
    }
}

fn describe_named(book: &ClientBook, name: &str) -> Result<String> {
    book.get(name)
        .map(describe)
        .ok_or_else(|| anyhow!("no client named {:?}", name.trim()))
}

fn expect_arity(word: &str, rest: &[&str], count: usize) -> Result<()> {
    if rest.len() != count {
        bail!(
            "{word} takes {count} argument(s), got {}; run with --help for usage",
            rest.len()
        );
    }
    Ok(())
}

fn split_name(word: &str, rest: &[&str]) -> Result<(String, String)> {
    let Some((name, details)) = rest.split_first() else {
        bail!("{word} requires a client name");
    };
    Ok(((*name).to_owned(), details.join(" ")))
}

fn parse_date_arg(raw: &str) -> Result<Date> {
    parse_date(raw).ok_or_else(|| anyhow!("invalid date {raw:?}; use yyyy-mm-dd"))
}

#[cfg(test)]
mod tests {
    use super::{Command, execute, parse_details_input};
    use anyhow::Result;
    use hkhub_app::MESSAGE_CONSTRAINTS;
    use hkhub_storage::JsonClientBookStorage;
    use hkhub_testkit::temp_book_path;
    use time::{Date, Month};

    fn run(storage: &JsonClientBookStorage, args: &[&str]) -> Result<String> {
        execute(&Command::parse(args)?, storage)
    }

    #[test]
    fn parse_joins_trailing_detail_words() -> Result<()> {
        let command = Command::parse(&["set", "Avery", "2023-06-01", "3", "months"])?;
        assert_eq!(
            command,
            Command::Set {
                name: "Avery".to_owned(),
                details: "2023-06-01 3 months".to_owned(),
            }
        );

        let command = Command::parse(&["add", "Jordan"])?;
        assert_eq!(
            command,
            Command::Add {
                name: "Jordan".to_owned(),
                details: None,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        for args in [
            &[][..],
            &["list", "extra"][..],
            &["due"][..],
            &["due", "2023-6-1"][..],
            &["set", "Avery"][..],
            &["done", "Avery"][..],
            &["parse"][..],
            &["frobnicate"][..],
        ] {
            assert!(Command::parse(args).is_err(), "args={args:?}");
        }
    }

    #[test]
    fn parse_due_reads_strict_date() -> Result<()> {
        let command = Command::parse(&["due", "2023-07-01"])?;
        assert_eq!(
            command,
            Command::Due {
                on_or_before: Date::from_calendar_date(2023, Month::July, 1)?,
            }
        );
        Ok(())
    }

    #[test]
    fn details_input_accepts_user_then_storage_form() -> Result<()> {
        assert_eq!(
            parse_details_input("2023-06-01 3 months")?.to_string(),
            "2023-06-01 P3M"
        );
        assert_eq!(
            parse_details_input("2023-06-01 P1Y2M")?.to_string(),
            "2023-06-01 P1Y2M"
        );
        let error = parse_details_input("soon").expect_err("garbage should fail");
        let message = format!("{error:#}");
        assert!(message.contains("invalid housekeeping details"));
        assert!(message.contains(MESSAGE_CONSTRAINTS));
        Ok(())
    }

    #[test]
    fn parse_command_reports_next_due() -> Result<()> {
        let (_dir, path) = temp_book_path()?;
        let storage = JsonClientBookStorage::new(&path);
        let output = run(&storage, &["parse", "2023-01-31", "1", "months"])?;
        assert_eq!(output, "2023-01-31 P1M\nNext housekeeping date: 2023-02-28");
        assert!(!path.exists(), "parse must not touch the book");
        Ok(())
    }

    #[test]
    fn add_set_done_remove_persist() -> Result<()> {
        let (_dir, path) = temp_book_path()?;
        let storage = JsonClientBookStorage::new(&path);

        let output = run(&storage, &["add", "Avery", "2023-06-01", "1", "years"])?;
        assert_eq!(output, "added Avery (next housekeeping 2024-06-01)");
        run(&storage, &["add", "Jordan"])?;
        run(&storage, &["add", "Riley", "2023-06-01 P2W"])?;

        let listing = run(&storage, &["list"])?;
        let names = listing
            .lines()
            .map(|line| line.split_whitespace().next().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Riley", "Avery", "Jordan"]);

        let output = run(&storage, &["set", "Jordan", "2023-06-01", "3", "days"])?;
        assert_eq!(output, "updated Jordan (next housekeeping 2023-06-04)");

        let output = run(&storage, &["done", "Riley", "2023-06-20"])?;
        assert_eq!(output, "serviced Riley (next housekeeping 2023-07-04)");

        let due = run(&storage, &["due", "2023-07-04"])?;
        assert_eq!(due.lines().count(), 2);

        assert_eq!(run(&storage, &["remove", "Avery"])?, "removed Avery");
        let reloaded = storage.read()?.expect("book was saved");
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.get("Avery").is_none());
        Ok(())
    }

    #[test]
    fn show_renders_human_readable_details() -> Result<()> {
        let (_dir, path) = temp_book_path()?;
        let storage = JsonClientBookStorage::new(&path);
        run(&storage, &["add", "Avery", "2023-06-01", "3", "months"])?;
        run(&storage, &["add", "Jordan"])?;

        assert_eq!(
            run(&storage, &["show", "Avery"])?,
            "Avery\nLast housekeeping date: 2023-06-01\nPreferred interval: 3 months\nNext housekeeping date: 2023-09-01"
        );
        assert_eq!(
            run(&storage, &["show", "Jordan"])?,
            "Jordan\nNo housekeeping details provided"
        );
        assert!(run(&storage, &["show", "Nobody"]).is_err());
        Ok(())
    }

    #[test]
    fn failed_mutation_leaves_book_untouched() -> Result<()> {
        let (_dir, path) = temp_book_path()?;
        let storage = JsonClientBookStorage::new(&path);
        run(&storage, &["add", "Avery", "2023-06-01", "3", "months"])?;
        let before = std::fs::read_to_string(&path)?;

        assert!(run(&storage, &["set", "Avery", "2023-06-01", "0", "days"]).is_err());
        assert!(run(&storage, &["add", "Avery"]).is_err());
        assert_eq!(std::fs::read_to_string(&path)?, before);
        Ok(())
    }

    #[test]
    fn empty_book_lists_nothing() -> Result<()> {
        let (_dir, path) = temp_book_path()?;
        let storage = JsonClientBookStorage::new(&path);
        assert_eq!(run(&storage, &["list"])?, "no clients");
        Ok(())
    }
}
