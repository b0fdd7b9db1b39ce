use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dailylog_tools::config::Config;
use dailylog_tools::model::{Entry, EntryFields, WriteMode};
use dailylog_tools::store::EntryStore;
use dailylog_tools::sync::SpreadsheetReconciler;
use dailylog_tools::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    let store =
        EntryStore::open(&config.database_path)?.with_weekday_names(config.sheet.weekday_names);
    let normalizer = config.sheet.normalizer();

    match cli.command {
        Command::List(args) => {
            let entries = store.get_all(args.search.as_deref())?;
            print_entries(&entries, args.json)
        }
        Command::Show(args) => {
            let date = normalizer.normalize(&args.date);
            match store.get_by_date(&date.iso)? {
                Some(entry) => print_entries(std::slice::from_ref(&entry), args.json),
                None => {
                    println!("no entry for {}", date.label);
                    Ok(())
                }
            }
        }
        Command::Dates => {
            for date in store.get_all_dates()? {
                println!("{date}");
            }
            Ok(())
        }
        Command::Save(args) => {
            let date = normalizer.normalize(args.date.as_deref().unwrap_or_default());
            let values = EntryFields {
                daily_log: args.daily_log,
                trades: args.trades,
                holdings: args.holdings,
                considerations: args.considerations,
                interests: args.interests,
            };
            let (mode, values) = if args.overwrite {
                (WriteMode::Overwrite, values)
            } else {
                (WriteMode::Merge, values.trimmed())
            };
            store.write(&date.iso, &values, mode)?;
            let verb = match mode {
                WriteMode::Merge => "merged",
                WriteMode::Overwrite => "overwritten",
            };
            println!("{} {verb}", date.label);
            Ok(())
        }
        Command::Delete(args) => {
            let date = normalizer.normalize(&args.date);
            if store.delete(&date.iso)? {
                println!("{} deleted", date.label);
            } else {
                println!("no entry for {}", date.label);
            }
            Ok(())
        }
        Command::Wipe(args) => {
            if !args.yes {
                eprintln!("refusing to wipe without --yes");
                return Ok(());
            }
            let removed = store.wipe_all()?;
            println!("removed {removed} entries");
            Ok(())
        }
        Command::Export(args) => {
            let reconciler = SpreadsheetReconciler::new(&store, &config.sheet);
            let rows = reconciler.export(&args.output)?;
            println!("exported {rows} entries to {}", args.output.display());
            Ok(())
        }
        Command::Import(args) => {
            if args.no_backup {
                config.sheet.backup_on_import = false;
            }
            let reconciler = SpreadsheetReconciler::new(&store, &config.sheet);
            let report = reconciler.import_replace(&args.input)?;
            if let Some(warning) = &report.backup_warning {
                eprintln!("warning: backup failed, import continued: {warning}");
            }
            if let Some(path) = &report.backup_path {
                println!("backup written to {}", path.display());
            }
            println!(
                "imported {} entries from sheet '{}'",
                report.rows_imported, report.sheet_name
            );
            Ok(())
        }
    }
}

fn print_entries(entries: &[Entry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    for entry in entries {
        println!("== {}", entry.date_label);
        for (title, value) in [
            ("Daily Log", &entry.fields.daily_log),
            ("Trades", &entry.fields.trades),
            ("Holdings", &entry.fields.holdings),
            ("Considerations", &entry.fields.considerations),
            ("Interests", &entry.fields.interests),
        ] {
            if !value.is_empty() {
                println!("[{title}]\n{value}");
            }
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Keep a date-keyed journal and exchange it with Excel workbooks."
)]
struct Cli {
    /// Configuration file to use instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configured path.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List entries, newest first.
    List(ListArgs),
    /// Show the entry for one date.
    Show(ShowArgs),
    /// Print every date that has an entry.
    Dates,
    /// Save text for a date, merging with existing text unless --overwrite.
    Save(SaveArgs),
    /// Delete the entry for a date.
    Delete(DeleteArgs),
    /// Delete every entry.
    Wipe(WipeArgs),
    /// Export all entries to an Excel workbook.
    Export(ExportArgs),
    /// Replace all entries with the rows of an Excel workbook.
    Import(ImportArgs),
}

#[derive(clap::Args)]
struct ListArgs {
    /// Only entries containing this text (case-insensitive).
    #[arg(long)]
    search: Option<String>,

    /// Print entries as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ShowArgs {
    /// Date such as 2024-03-04, 2024.03.04 or 2024/03/04.
    #[arg(long)]
    date: String,

    /// Print the entry as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct DeleteArgs {
    #[arg(long)]
    date: String,
}

#[derive(clap::Args)]
struct SaveArgs {
    /// Target date; today when omitted.
    #[arg(long)]
    date: Option<String>,

    #[arg(long, default_value = "")]
    daily_log: String,

    #[arg(long, default_value = "")]
    trades: String,

    #[arg(long, default_value = "")]
    holdings: String,

    #[arg(long, default_value = "")]
    considerations: String,

    #[arg(long, default_value = "")]
    interests: String,

    /// Replace the stored entry instead of appending to it.
    #[arg(long)]
    overwrite: bool,
}

#[derive(clap::Args)]
struct WipeArgs {
    /// Confirm deletion of every entry.
    #[arg(long)]
    yes: bool,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Workbook to write; replaced if it exists.
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct ImportArgs {
    /// Workbook to read.
    #[arg(long)]
    input: PathBuf,

    /// Skip the backup export written before importing.
    #[arg(long)]
    no_backup: bool,
}
