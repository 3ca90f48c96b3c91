//! Command execution.
//!
//! Each audited command opens its own connection and authorizes the caller
//! before touching data; `init` and `user` are administrative and skip
//! authorization.

use crate::error::{CliError, Result};
use crate::{AuthorCommand, BookCommand, Cli, Commands, UserCommand};
use bookaudit_core::db::migrations::latest_version;
use bookaudit_core::{
    after, authorize, before, list_users, open_db_with_config, register_user, AuditSession,
    Author, AuthorPatch, AuthorService, Book, BookPatch, BookService, Filter, StoreConfig,
    OBJECT_AUTHORS, OBJECT_BOOKS,
};
use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Initialized<'a> {
    db: &'a Path,
    schema_version: u32,
}

#[derive(Debug, Serialize)]
struct Registered<'a> {
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct Deleted {
    #[serde(rename = "type")]
    object_type: &'static str,
    id: i64,
}

/// Runs the parsed command against the store described by `config`.
pub fn run(cli: &Cli, config: &StoreConfig, out: &mut dyn Write) -> Result<()> {
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match &cli.command {
        Commands::Init => {
            open_db_with_config(config)?;
            print_json(
                out,
                &Initialized {
                    db: &config.db_path,
                    schema_version: latest_version(),
                },
            )
        }
        Commands::User { command } => user(config, command, out),
        Commands::Author { command } => {
            let conn = open_db_with_config(config)?;
            let session = authorize(&conn, caller(cli)?)?;
            author(&session, command, out)
        }
        Commands::Book { command } => {
            let conn = open_db_with_config(config)?;
            let session = authorize(&conn, caller(cli)?)?;
            book(&session, command, out)
        }
        Commands::Events {
            after: after_at,
            before: before_at,
            by_user,
            operation,
            object_type,
        } => {
            let conn = open_db_with_config(config)?;
            let session = authorize(&conn, caller(cli)?)?;

            let mut filters = Vec::new();
            if let Some(at) = after_at {
                filters.push(after(*at));
            }
            if let Some(at) = before_at {
                filters.push(before(*at));
            }
            if let Some(name) = by_user {
                filters.push(Filter::user(name.as_str()));
            }
            if let Some(op) = operation {
                filters.push(Filter::operation(*op));
            }
            if let Some(tag) = object_type {
                filters.push(Filter::object_type(tag.as_str()));
            }
            print_json(out, &session.query_events(&filters)?)
        }
    }
}

fn user(config: &StoreConfig, command: &UserCommand, out: &mut dyn Write) -> Result<()> {
    let conn = open_db_with_config(config)?;
    match command {
        UserCommand::Add { name } => {
            register_user(&conn, name)?;
            print_json(out, &Registered { user: name })
        }
        UserCommand::List => print_json(out, &list_users(&conn)?),
    }
}

fn author(session: &AuditSession<'_>, command: &AuthorCommand, out: &mut dyn Write) -> Result<()> {
    let service = AuthorService::new(session);
    match command {
        AuthorCommand::Add { name, dob } => {
            let mut author = Author::new(name.as_str(), *dob);
            author.id = service.create_author(&author)?;
            print_json(out, &author)
        }
        AuthorCommand::Get { id } => print_json(out, &service.get_author(*id)?),
        AuthorCommand::List => print_json(out, &service.list_authors()?),
        AuthorCommand::Update { id, name, dob } => {
            let patch = AuthorPatch {
                name: name.clone(),
                date_of_birth: *dob,
            };
            print_json(out, &service.patch_author(*id, &patch)?)
        }
        AuthorCommand::Delete { id } => {
            service.delete_author(*id)?;
            print_json(
                out,
                &Deleted {
                    object_type: OBJECT_AUTHORS,
                    id: *id,
                },
            )
        }
    }
}

fn book(session: &AuditSession<'_>, command: &BookCommand, out: &mut dyn Write) -> Result<()> {
    let service = BookService::new(session);
    match command {
        BookCommand::Add {
            author,
            title,
            published,
        } => {
            let mut book = Book::new(*author, title.as_str(), *published);
            book.id = service.create_book(&book)?;
            print_json(out, &book)
        }
        BookCommand::Get { author, id } => print_json(out, &service.get_book(*author, *id)?),
        BookCommand::List => print_json(out, &service.list_books()?),
        BookCommand::Update {
            author,
            id,
            title,
            published,
        } => {
            let patch = BookPatch {
                title: title.clone(),
                published: *published,
            };
            print_json(out, &service.patch_book(*author, *id, &patch)?)
        }
        BookCommand::Delete { author, id } => {
            service.delete_book(*author, *id)?;
            print_json(
                out,
                &Deleted {
                    object_type: OBJECT_BOOKS,
                    id: *id,
                },
            )
        }
    }
}

fn caller(cli: &Cli) -> Result<&str> {
    cli.user
        .as_deref()
        .filter(|user| !user.is_empty())
        .ok_or(CliError::MissingUser)
}

fn print_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init => "init",
        Commands::User { .. } => "user",
        Commands::Author { .. } => "author",
        Commands::Book { .. } => "book",
        Commands::Events { .. } => "events",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit;
    use clap::Parser;
    use serde_json::Value;

    struct Fixture {
        _dir: tempfile::TempDir,
        config: StoreConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = StoreConfig {
                db_path: dir.path().join("cli.db"),
                ..StoreConfig::default()
            };
            Self { _dir: dir, config }
        }

        fn run(&self, args: &[&str]) -> Result<Value> {
            let cli = Cli::try_parse_from(std::iter::once("bookaudit").chain(args.iter().copied()))
                .unwrap();
            let mut out = Vec::new();
            run(&cli, &self.config, &mut out)?;
            Ok(serde_json::from_slice(&out).unwrap())
        }
    }

    #[test]
    fn author_lifecycle_prints_records() {
        let fx = Fixture::new();
        assert_eq!(fx.run(&["init"]).unwrap()["schema_version"], 1);
        fx.run(&["user", "add", "bill"]).unwrap();

        let created = fx
            .run(&["-u", "bill", "author", "add", "--name", "Jane Austen", "--dob", "1775-12-16"])
            .unwrap();
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["dateofbirth"], "1775-12-16");

        let updated = fx
            .run(&["-u", "bill", "author", "update", &id.to_string(), "--name", "J. Austen"])
            .unwrap();
        assert_eq!(updated["name"], "J. Austen");
        assert_eq!(updated["dateofbirth"], "1775-12-16");

        let deleted = fx
            .run(&["-u", "bill", "author", "delete", &id.to_string()])
            .unwrap();
        assert_eq!(deleted["type"], "authors");

        let err = fx
            .run(&["-u", "bill", "author", "get", &id.to_string()])
            .unwrap_err();
        assert_eq!(err.exit_code(), exit::NOT_FOUND);
    }

    #[test]
    fn audited_commands_require_an_admitted_caller() {
        let fx = Fixture::new();
        fx.run(&["user", "add", "bill"]).unwrap();

        let mut cli = Cli::try_parse_from(["bookaudit", "author", "list"]).unwrap();
        cli.user = None;
        assert!(matches!(caller(&cli), Err(CliError::MissingUser)));
        let err = run(&cli, &fx.config, &mut Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), exit::INVALID_INPUT);

        cli.user = Some(String::new());
        assert!(matches!(caller(&cli), Err(CliError::MissingUser)));

        let err = fx.run(&["-u", "mallory", "author", "list"]).unwrap_err();
        assert_eq!(err.exit_code(), exit::UNAUTHORIZED);
    }

    #[test]
    fn book_update_reports_not_implemented() {
        let fx = Fixture::new();
        fx.run(&["user", "add", "bill"]).unwrap();
        let author = fx
            .run(&["-u", "bill", "author", "add", "--name", "Virginia Woolf", "--dob", "1882-01-25"])
            .unwrap()["id"]
            .as_i64()
            .unwrap();
        let book = fx
            .run(&[
                "-u",
                "bill",
                "book",
                "add",
                "--author",
                &author.to_string(),
                "--title",
                "Orlando",
                "--published",
                "1928-10-11",
            ])
            .unwrap()["id"]
            .as_i64()
            .unwrap();

        let err = fx
            .run(&[
                "-u",
                "bill",
                "book",
                "update",
                &author.to_string(),
                &book.to_string(),
                "--title",
                "Orlando: A Biography",
            ])
            .unwrap_err();
        assert_eq!(err.exit_code(), exit::NOT_IMPLEMENTED);
    }

    #[test]
    fn events_command_applies_filters() {
        let fx = Fixture::new();
        fx.run(&["user", "add", "bill"]).unwrap();
        fx.run(&["-u", "bill", "author", "list"]).unwrap();

        let events = fx
            .run(&["-u", "bill", "events", "--type", "authors"])
            .unwrap();
        let events = events.as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["operation"], "READ");
        assert!(events[0]["id"].is_null());

        let all = fx.run(&["-u", "bill", "events"]).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 4);
    }
}
