// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use commands::Command;
use config::Config;
use hkhub_storage::JsonClientBookStorage;
use std::env;
use std::path::PathBuf;
use tracing::debug;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `hkhub --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    logging::init(config.log_filter());

    let book_path = match &options.book_path {
        Some(path) => path.clone(),
        None => config.book_path()?,
    };
    if options.print_book_path {
        println!("{}", book_path.display());
        return Ok(());
    }

    let storage = JsonClientBookStorage::new(&book_path);
    debug!(path = %book_path.display(), "using client book");

    if options.check_only {
        let book = storage.read()?.unwrap_or_default();
        println!("ok: {} client(s) in {}", book.len(), book_path.display());
        return Ok(());
    }

    let command = options.command.unwrap_or(Command::List);
    let output = commands::execute(&command, &storage).with_context(|| {
        format!(
            "client book {} -- if this path is wrong, set [storage].book_path or HKHUB_BOOK_PATH",
            book_path.display()
        )
    })?;
    println!("{output}");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    book_path: Option<PathBuf>,
    print_config_path: bool,
    print_book_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
}

/// Flags come first; the first non-flag word starts the command and every
/// word after it belongs to that command.
fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        book_path: None,
        print_config_path: false,
        print_book_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
    };

    let args = args.into_iter().collect::<Vec<_>>();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_ref() {
            "--config" => {
                index += 1;
                let value: &str = args
                    .get(index)
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?
                    .as_ref();
                options.config_path = PathBuf::from(value);
            }
            "--book" => {
                index += 1;
                let value: &str = args
                    .get(index)
                    .ok_or_else(|| anyhow::anyhow!("--book requires a file path"))?
                    .as_ref();
                hkhub_storage::validate_book_path(value)?;
                options.book_path = Some(PathBuf::from(value));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-book-path" => {
                options.print_book_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            flag if flag.starts_with('-') => {
                return Err(anyhow::anyhow!(
                    "unknown argument {flag:?}; run with --help to see supported options"
                ));
            }
            _ => {
                options.command = Some(Command::parse(&args[index..])?);
                break;
            }
        }
        index += 1;
    }

    Ok(options)
}

fn print_help() {
    println!("hkhub: housekeeping client book");
    println!();
    println!("usage: hkhub [options] [command]");
    println!();
    println!("options:");
    println!("  --config <path>          Use a specific config path");
    println!("  --book <path>            Use a specific client book file");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-book-path        Print resolved client book path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and client book, then exit");
    println!("  --help                   Show this help");
    println!();
    println!("commands (default: list):");
    println!("  list                     Clients ordered by next housekeeping date");
    println!("  due <yyyy-mm-dd>         Clients due on or before a date");
    println!("  add <name> [<details>]   Add a client");
    println!("  set <name> <details>     Replace a client's housekeeping details");
    println!("  done <name> <yyyy-mm-dd> Record a completed service");
    println!("  remove <name>            Remove a client");
    println!("  show <name>              Show a client's details");
    println!("  parse <details>          Check details without touching the book");
    println!();
    println!("details: yyyy-mm-dd n (days|weeks|months|years), or yyyy-mm-dd P[nY][nM][nW][nD]");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use crate::commands::Command;
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/hkhub-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                book_path: None,
                print_config_path: false,
                print_book_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
                command: None,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_and_book_overrides() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "--book", "/custom/clients.json"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(
            options.book_path,
            Some(PathBuf::from("/custom/clients.json"))
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--book"], default_options_path())
            .expect_err("missing book value should fail");
        assert!(error.to_string().contains("--book requires a file path"));
    }

    #[test]
    fn parse_cli_args_rejects_uri_book_path() {
        assert!(
            parse_cli_args(
                vec!["--book", "https://example.com/clients.json"],
                default_options_path()
            )
            .is_err()
        );
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_book_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_hands_remaining_words_to_command() -> Result<()> {
        let options = parse_cli_args(
            vec!["--book", "/b.json", "set", "Avery", "2023-06-01", "3", "months"],
            default_options_path(),
        )?;
        assert_eq!(
            options.command,
            Some(Command::Set {
                name: "Avery".to_owned(),
                details: "2023-06-01 3 months".to_owned(),
            })
        );
        Ok(())
    }

    #[test]
    fn flags_after_command_belong_to_command() {
        let error = parse_cli_args(vec!["list", "--check"], default_options_path())
            .expect_err("list takes no arguments");
        assert!(error.to_string().contains("list takes 0 argument(s)"));
    }
}
