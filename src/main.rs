use std::{env, process::ExitCode, sync::Arc};

use catalog_sync::{
    catalog_source::JsonCatalogSource,
    config::Config,
    data_layer_error,
    metadata_store::{DbMetadataStore, MetadataStore},
    record_store::{DbRecordStore, RecordStore},
    sync_service::CatalogSyncService,
    time_provider::CoreTimeProvider,
};
use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Keeps the local course catalog in step with the upstream term catalog")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "config.json")]
    config: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Synchronize the course and session lists of a term
    Sync {
        term_code: String,
        /// Ignore the staleness window
        #[arg(long)]
        force: bool,
    },
    /// List every term that has been synchronized
    Terms,
    /// Show a stored course and its sessions
    Course {
        term_code: String,
        course_name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "catalog_sync failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::from_file(&cli.config)?;
    let db = SqlitePoolOptions::new().connect(&env::var("DATABASE_URL")?).await?;
    data_layer_error::migrate(&db).await?;

    let metadata = Arc::new(DbMetadataStore::new(db.clone()));
    let records = Arc::new(DbRecordStore::new(db.clone()));

    match cli.command {
        Command::Sync { term_code, force } => {
            let svc = Arc::new(CatalogSyncService::new(
                Arc::new(JsonCatalogSource::new(&config.catalog_path)),
                metadata,
                records,
                Arc::new(CoreTimeProvider::new()),
                config.sync_settings(),
            ));

            let handle = match svc.synchronize(&term_code, force).await {
                Ok(handle) => handle,
                Err(e) if e.is_conflict() => {
                    println!("conflict: {e}");
                    return Ok(ExitCode::from(2));
                }
                Err(e) => return Err(e.into()),
            };

            let report = handle.wait().await?;
            println!(
                "{}: course list {:?}, {} removed, sessions {} updated / {} unchanged / {} failed",
                report.term_code, report.course_list, report.courses_removed,
                report.sessions_updated, report.sessions_skipped, report.sessions_failed
            );
            if report.sessions_failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Terms => {
            for term_code in metadata.list_terms().await? {
                println!("{term_code}");
            }
        }
        Command::Course { term_code, course_name } => {
            let Some(course) = records.find_course(&term_code, &course_name).await? else {
                println!("{course_name} not found in term {term_code}");
                return Ok(ExitCode::FAILURE);
            };

            println!("{} {}: {}", course.course_name, course.title, course.description);
            for session in records.get_sessions(&term_code, &course.course_id).await? {
                println!(
                    "  {} ({} credits{})",
                    session.session_id,
                    session.credit,
                    if session.online_only { ", online" } else { "" }
                );
                for meeting in &session.meetings {
                    println!(
                        "    {} {} {:02}:{:02}-{:02}:{:02} {} {}",
                        meeting.meeting_type,
                        meeting.meeting_days_list.join(""),
                        meeting.start_time.hour, meeting.start_time.minute,
                        meeting.end_time.hour, meeting.end_time.minute,
                        meeting.building_name.as_deref().unwrap_or("TBA"),
                        meeting.room.as_deref().unwrap_or(""),
                    );
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
