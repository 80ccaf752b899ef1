//! `staffdesk` - CLI for managing staff records
//!
//! This binary drives the staff listing: it opens the configured document
//! store, runs one action and prints the result.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use staffdesk::cli::{
    render_rows, AddCommand, Cli, Command, ConfigCommand, EditCommand, ExportCommand, ListCommand,
};
use staffdesk::record::Gender;
use staffdesk::store::{RecordStore, SqliteBackend};
use staffdesk::{init_logging, Config, Error, StaffApp};

type App = StaffApp<SqliteBackend>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Validating a file must not depend on the active configuration loading.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return validate_config(file.clone().or_else(|| cli.config.clone()));
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    let command = match cli.command {
        Command::Config(cmd) => return handle_config(&config, &cmd),
        command => command,
    };

    let app = open_app(&config)?;
    match command {
        Command::List(cmd) => handle_list(&app, &cmd).await,
        Command::Add(cmd) => handle_add(&app, cmd).await,
        Command::Edit(cmd) => handle_edit(&app, cmd).await,
        Command::Delete(cmd) => handle_delete(&app, &cmd.data_id).await,
        Command::Export(cmd) => handle_export(&app, &config, cmd).await,
        Command::Config(_) => Ok(()),
    }
}

fn open_app(config: &Config) -> anyhow::Result<App> {
    let path = config.database_path();
    let backend = SqliteBackend::open(&path)
        .with_context(|| format!("failed to open staff database {}", path.display()))?;
    let store = RecordStore::with_collection(backend, config.store.collection.clone());
    Ok(StaffApp::new(store)
        .with_auto_hide(config.auto_hide())
        .with_csv_style(config.csv_style()))
}

/// Print the visible notification, if any. Problems go to stderr.
fn report(app: &App) {
    if let Some(notification) = app.snapshot().notification {
        if notification.severity.is_problem() {
            eprintln!("{}", notification.message);
        } else {
            println!("{}", notification.message);
        }
    }
}

async fn handle_list(app: &App, cmd: &ListCommand) -> anyhow::Result<()> {
    app.load().await.into_result()?;
    if let Some(filter) = &cmd.filter {
        app.set_filter(filter.clone());
    }
    println!("{}", render_rows(&app.visible_rows(), cmd.format)?);
    Ok(())
}

async fn handle_add(app: &App, cmd: AddCommand) -> anyhow::Result<()> {
    app.load().await.into_result()?;
    app.open_add_dialog();
    app.update_dialog(|dialog| {
        dialog.set_id(cmd.id);
        dialog.set_full_name(cmd.name);
        dialog.set_birthday(cmd.birthday);
        dialog.set_gender_id(Gender::from(cmd.gender).code());
    });
    submit(app).await
}

async fn handle_edit(app: &App, cmd: EditCommand) -> anyhow::Result<()> {
    if !cmd.has_changes() {
        bail!("nothing to change: pass at least one of --id, --name, --birthday, --gender");
    }
    app.load().await.into_result()?;
    app.open_edit_dialog(&cmd.data_id)?;
    app.update_dialog(|dialog| {
        if let Some(id) = cmd.id {
            dialog.set_id(id);
        }
        if let Some(name) = cmd.name {
            dialog.set_full_name(name);
        }
        if let Some(birthday) = cmd.birthday {
            dialog.set_birthday(birthday);
        }
        if let Some(gender) = cmd.gender {
            dialog.set_gender_id(Gender::from(gender).code());
        }
    });
    submit(app).await
}

async fn submit(app: &App) -> anyhow::Result<()> {
    match app.submit_dialog().await.into_result() {
        Ok(()) => {
            report(app);
            Ok(())
        }
        Err(Error::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{field}: {message}");
            }
            bail!("record not saved: {} invalid field(s)", errors.len())
        }
        Err(err) => Err(err.into()),
    }
}

async fn handle_delete(app: &App, data_id: &str) -> anyhow::Result<()> {
    app.delete(data_id).await.into_result()?;
    report(app);
    Ok(())
}

async fn handle_export(app: &App, config: &Config, cmd: ExportCommand) -> anyhow::Result<()> {
    app.load().await.into_result()?;
    if let Some(filter) = cmd.filter {
        app.set_filter(filter);
    }
    let dir = cmd.out.unwrap_or_else(|| config.export_dir());
    let path = app.export(cmd.format.into(), &dir)?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Database path:  {}", config.database_path().display());
                println!("  Collection:     {}", config.store.collection);
                println!();
                println!("[Export]");
                println!("  Directory:      {}", config.export_dir().display());
                println!("  Quote CSV:      {}", config.export.quote_csv);
                println!();
                println!("[Notifications]");
                println!("  Auto-hide (ms): {}", config.notifications.auto_hide_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            return validate_config(file.clone());
        }
    }
    Ok(())
}

fn validate_config(file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    Config::load_from(Some(path)).context("configuration is invalid")?;
    println!("Configuration is valid.");
    Ok(())
}
