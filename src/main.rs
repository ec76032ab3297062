use crate::cli::{Cli, Commands, ConfigCommands};
use crate::db::config_table::{get_config_entries, set_config_value};
use crate::db::connection::{init_db, Database};
use crate::db::runs::get_recent_runs;
use crate::report::RunReport;
use crate::source::{AirbnbSource, FileSource};
use chrono::{DateTime, Local};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod db;
mod domain;
mod errors;
mod report;
mod source;
mod spreadsheets;
mod sync;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let db = Database::new(cli.db.clone());

    if let Err(e) = init_db(&db) {
        eprintln!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    let ok = match cli.command {
        Commands::Sync(args) => {
            let report = sync::execute(&db, Local::now().date_naive(), AirbnbSource::from_settings);
            print_report(&report, args.json)
        }
        Commands::Import(args) => {
            let source = FileSource::new(args.file);
            let report = sync::execute(&db, Local::now().date_naive(), |_| Ok(source));
            print_report(&report, args.json)
        }
        Commands::Export(args) => match spreadsheets::export_reservations_xlsx(&db, &args.file) {
            Ok(rows) => {
                println!("✅ Exported {rows} reservations to {}", args.file.display());
                true
            }
            Err(e) => {
                eprintln!("❌ {e}");
                false
            }
        },
        Commands::Config(args) => match args.command {
            ConfigCommands::Show => show_config(&db),
            ConfigCommands::Set(set) => {
                match db.with_conn(|conn| set_config_value(conn, &set.key, &set.value)) {
                    Ok(()) => {
                        println!("✅ Set {}", set.key);
                        true
                    }
                    Err(e) => {
                        eprintln!("❌ {e}");
                        false
                    }
                }
            }
        },
        Commands::Runs => show_runs(&db),
    };

    if !ok {
        std::process::exit(1);
    }
}

fn print_report(report: &RunReport, json: bool) -> bool {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("❌ Could not serialize report: {e}"),
        }
    } else if report.success {
        println!("✅ {}", report.message);
    } else {
        println!("❌ {}", report.message);
    }
    report.success
}

fn show_config(db: &Database) -> bool {
    let entries = match db.with_conn(|conn| get_config_entries(conn)) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("❌ {e}");
            return false;
        }
    };

    for entry in entries {
        let value = match entry.key.as_str() {
            "cookie" | "key" if !entry.value.starts_with("PUT ") => mask(&entry.value),
            _ => entry.value.clone(),
        };
        println!("{:<20} {:<24} {}", entry.key, value, entry.instructions);
    }
    true
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}…")
}

fn show_runs(db: &Database) -> bool {
    let runs = match db.with_conn(|conn| get_recent_runs(conn, 20)) {
        Ok(runs) => runs,
        Err(e) => {
            eprintln!("❌ {e}");
            return false;
        }
    };

    let when = |ts: i64| {
        DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| ts.to_string())
    };

    for run in runs {
        let counts = match (run.inserted, run.updated, run.canceled) {
            (Some(i), Some(u), Some(c)) => format!("+{i} ~{u} x{c}"),
            _ => "-".to_string(),
        };
        let status = if run.success { "ok" } else { "failed" };
        let finished = run.finished_at.map(when).unwrap_or_else(|| "running".to_string());
        println!(
            "#{:<4} {} → {}  {:<24} {:<7} {:<14} {}",
            run.id,
            when(run.started_at),
            finished,
            run.source,
            status,
            counts,
            run.error_message.as_deref().unwrap_or("")
        );
    }
    true
}
