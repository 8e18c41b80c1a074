//! Folio Curator - author maintenance CLI and admin API server

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_curator::{
    api,
    config::{AppConfig, LoggingConfig},
    models::author::UpdateAuthor,
    repository::Repository,
    services::{cv_import::CvPreview, Services},
    AppState,
};

#[derive(Parser)]
#[command(name = "folio-curator", version)]
#[command(about = "Author and publication maintenance for an academic portfolio")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the admin API server
    Serve,
    /// Apply database migrations
    Migrate,
    /// List author pairs that may be the same person
    Duplicates,
    /// List author rows that are probably not people
    Suspicious,
    /// List initial-only and surname-only authors with merge suggestions
    Fragments,
    /// Show an author with every linked publication and its co-authors
    CheckAuthor {
        id: i32,
    },
    /// Delete an author and its publication links
    DeleteAuthor {
        id: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Change an author's name or owner flag
    UpdateAuthor {
        id: i32,
        #[arg(long)]
        first: Option<String>,
        /// An empty value clears the middle name
        #[arg(long)]
        middle: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long, conflicts_with = "not_owner")]
        owner: bool,
        #[arg(long)]
        not_owner: bool,
    },
    /// Move the secondary author's publications to the primary and delete it
    Merge {
        primary: i32,
        secondary: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Import publications from a plain-text CV
    ImportCv {
        file: PathBuf,
        /// Show what would be imported without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Year for entries that carry none (defaults to the current year)
        #[arg(long)]
        default_year: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so command output on stdout stays readable.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("folio_curator={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

/// Open the pool once, run the command, and close the pool whatever the outcome.
async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::debug!("Connected to database");

    let result = dispatch(command, &pool, config).await;
    pool.close().await;
    result
}

async fn dispatch(command: Command, pool: &PgPool, config: AppConfig) -> anyhow::Result<()> {
    let services = Services::new(Repository::new(pool.clone()), &config);

    match command {
        Command::Serve => serve(pool, services, config).await,
        Command::Migrate => {
            migrate(pool).await?;
            println!("Migrations applied");
            Ok(())
        }
        Command::Duplicates => duplicates(&services).await,
        Command::Suspicious => suspicious(&services).await,
        Command::Fragments => fragments(&services).await,
        Command::CheckAuthor { id } => check_author(&services, id).await,
        Command::DeleteAuthor { id, yes } => delete_author(&services, id, yes).await,
        Command::UpdateAuthor {
            id,
            first,
            middle,
            last,
            owner,
            not_owner,
        } => {
            let is_owner = match (owner, not_owner) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let data = UpdateAuthor {
                first_name: first,
                middle_name: middle,
                last_name: last,
                is_owner,
                ..Default::default()
            };
            update_author(&services, id, &data).await
        }
        Command::Merge {
            primary,
            secondary,
            yes,
        } => merge(&services, primary, secondary, yes).await,
        Command::ImportCv {
            file,
            dry_run,
            yes,
            default_year,
        } => {
            let year = default_year.unwrap_or_else(|| Utc::now().year());
            import_cv(&services, &file, year, dry_run, yes).await
        }
    }
}

async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations completed");
    Ok(())
}

async fn serve(pool: &PgPool, services: Services, config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Folio Curator v{}", env!("CARGO_PKG_VERSION"));

    migrate(pool).await?;

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid host address '{}'", config.server.host))?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

/// Ask a yes/no question on stdin; anything but y/yes is a no.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn duplicates(services: &Services) -> anyhow::Result<()> {
    let candidates = services.authors.duplicates().await?;
    if candidates.is_empty() {
        println!("No potential duplicates found");
        return Ok(());
    }

    println!("Found {} potential duplicate pair(s):\n", candidates.len());
    for (i, c) in candidates.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}  <->  [{}] {}",
            i + 1,
            c.first_id,
            c.first_name,
            c.second_id,
            c.second_name
        );
        println!(
            "     score {:.3}  full name {:.3}  last name {:.3}",
            c.score, c.full_name_similarity, c.last_name_similarity
        );
    }
    println!("\nUse `folio-curator merge <primary> <secondary>` to merge a pair.");
    Ok(())
}

async fn suspicious(services: &Services) -> anyhow::Result<()> {
    let flagged = services.authors.suspicious().await?;
    if flagged.is_empty() {
        println!("No suspicious authors found");
        return Ok(());
    }

    println!("Found {} suspicious entr(y/ies):\n", flagged.len());
    for s in &flagged {
        println!("[{}] {}: {}", s.author_id, s.display_name, s.reason_text);
    }
    Ok(())
}

async fn fragments(services: &Services) -> anyhow::Result<()> {
    let groups = services.authors.fragments().await?;
    if groups.is_empty() {
        println!("No fragmented author names found");
        return Ok(());
    }

    for group in &groups {
        println!("{}:", group.last_name);
        for suggestion in &group.fragments {
            let fragment = &suggestion.fragment;
            match suggestion.candidates.as_slice() {
                [] => println!("  [{}] {}: no full-name author", fragment.id, fragment.display_name()),
                [only] => println!(
                    "  [{}] {} -> merge into [{}] {}",
                    fragment.id,
                    fragment.display_name(),
                    only.id,
                    only.display_name()
                ),
                several => {
                    println!("  [{}] {}: ambiguous, candidates:", fragment.id, fragment.display_name());
                    for c in several {
                        println!("      [{}] {}", c.id, c.display_name());
                    }
                }
            }
        }
    }
    Ok(())
}

async fn check_author(services: &Services, id: i32) -> anyhow::Result<()> {
    let check = services.authors.check(id).await?;
    let author = &check.author;

    println!("Author {}: {}", author.id, author.display_name());
    println!("  first:  {}", author.first_name);
    println!("  middle: {}", author.middle_name.as_deref().unwrap_or("-"));
    println!("  last:   {}", author.last_name);
    println!("  owner:  {}", if author.is_owner { "yes" } else { "no" });
    if let Some(ref email) = author.email {
        println!("  email:  {}", email);
    }
    if let Some(ref affiliation) = author.affiliation {
        println!("  affiliation: {}", affiliation);
    }

    println!("\nLinked to {} publication(s):", check.publications.len());
    for detail in &check.publications {
        let p = &detail.publication;
        let mut flags = Vec::new();
        if p.is_corresponding {
            flags.push("corresponding");
        }
        if p.equal_contribution {
            flags.push("equal contribution");
        }
        println!(
            "  [{}] {} ({}, {}) position {}{}",
            p.publication_id,
            p.title,
            p.year,
            p.publication_type.as_str(),
            p.position,
            if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            }
        );
        let co_authors = detail
            .co_authors
            .iter()
            .map(|a| format!("{} {} [{}]", a.first_name, a.last_name, a.id))
            .collect::<Vec<_>>();
        if !co_authors.is_empty() {
            println!("      with {}", co_authors.join(", "));
        }
    }

    if !check.publications.is_empty() {
        println!(
            "\nThis author has publications. Prefer `update-author {}` to fix the name, \
             or `merge <primary> {}` if it duplicates another author.",
            id, id
        );
    }
    Ok(())
}

async fn delete_author(services: &Services, id: i32, yes: bool) -> anyhow::Result<()> {
    let author = services.authors.get_by_id(id).await?;
    let publications = services.authors.publications(id).await?;

    println!("Author {}: {}", author.id, author.display_name());
    if publications.is_empty() {
        println!("No publication links");
    } else {
        println!("Linked to {} publication(s):", publications.len());
        for p in &publications {
            println!("  [{}] {} ({})", p.publication_id, p.title, p.year);
        }
    }

    if !yes && !confirm("Delete this author and its publication links?")? {
        println!("Aborted");
        return Ok(());
    }

    let removed = services.authors.delete_with_links(id).await?;
    println!("Deleted author {} and {} publication link(s)", id, removed);
    Ok(())
}

async fn update_author(services: &Services, id: i32, data: &UpdateAuthor) -> anyhow::Result<()> {
    if data.is_empty() {
        bail!("Nothing to update; pass --first, --middle, --last, --owner or --not-owner");
    }
    let before = services.authors.get_by_id(id).await?;
    let after = services.authors.update(id, data).await?;
    println!("Updated author {}: {} -> {}", id, before.display_name(), after.display_name());
    if before.is_owner != after.is_owner {
        println!("  owner: {} -> {}", before.is_owner, after.is_owner);
    }
    Ok(())
}

async fn merge(services: &Services, primary: i32, secondary: i32, yes: bool) -> anyhow::Result<()> {
    let preview = services.authors.merge_preview(primary, secondary).await?;

    println!(
        "Primary   [{}] {} ({} publication(s))",
        preview.primary.id,
        preview.primary.display_name(),
        preview.primary_publications
    );
    println!(
        "Secondary [{}] {} ({} publication(s))",
        preview.secondary.id,
        preview.secondary.display_name(),
        preview.secondary_publications
    );
    println!(
        "{} link(s) will move to the primary, {} shared publication(s) keep the primary's link",
        preview.plan.transferable.len(),
        preview.plan.conflicting.len()
    );
    for link in &preview.plan.conflicting {
        println!("  shared: publication {}", link.publication_id);
    }

    if !yes && !confirm("Merge the secondary into the primary and delete it?")? {
        println!("Aborted");
        return Ok(());
    }

    let report = services.authors.merge(primary, secondary).await?;
    println!(
        "Merged author {} into {}: {} link(s) transferred, {} conflict(s) dropped",
        report.secondary_id, report.primary_id, report.transferred_count, report.conflict_count
    );
    Ok(())
}

fn print_plan(preview: &CvPreview) {
    println!("{} entr(y/ies) already in the database:", preview.plan.matched.len());
    for m in &preview.plan.matched {
        println!(
            "  {} -> [{}] {} ({:.2})",
            m.entry.title, m.publication_id, m.existing_title, m.score
        );
    }
    println!("\n{} new entr(y/ies):", preview.plan.unmatched.len());
    for e in &preview.plan.unmatched {
        let authors = e.authors.iter().map(|a| a.full_name()).collect::<Vec<_>>();
        println!(
            "  [{}] {} ({}) {}",
            e.publication_type.as_str(),
            e.title,
            e.year,
            authors.join(", ")
        );
    }
    if !preview.skipped.is_empty() {
        println!("\n{} entr(y/ies) could not be parsed:", preview.skipped.len());
        for s in &preview.skipped {
            println!("  {}", s);
        }
    }
}

async fn import_cv(
    services: &Services,
    file: &Path,
    default_year: i32,
    dry_run: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let preview = services.cv_import.preview(&text, default_year).await?;
    print_plan(&preview);

    if dry_run || preview.plan.unmatched.is_empty() {
        return Ok(());
    }
    if !yes && !confirm("Import the new entries?")? {
        println!("Aborted");
        return Ok(());
    }

    let report = services.cv_import.import(&text, default_year).await?;
    println!(
        "\nCreated {} publication(s), {} new author(s)",
        report.created.len(),
        report.authors_created.len()
    );
    for a in &report.authors_created {
        println!("  new author [{}] {}", a.id, a.display_name());
    }
    if !report.skipped_authors.is_empty() {
        println!("Skipped author names: {}", report.skipped_authors.join(", "));
    }
    if !report.failed.is_empty() {
        println!("{} entr(y/ies) failed:", report.failed.len());
        for f in &report.failed {
            println!("  {}: {}", f.title, f.error);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_merge() {
        let cli = Cli::try_parse_from(["folio-curator", "merge", "3", "7", "--yes"]).unwrap();
        match cli.command {
            Command::Merge {
                primary,
                secondary,
                yes,
            } => assert_eq!((primary, secondary, yes), (3, 7, true)),
            _ => panic!("expected merge"),
        }
    }

    #[test]
    fn test_missing_argument_is_usage_error() {
        let err = Cli::try_parse_from(["folio-curator", "check-author"]).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_owner_flags_conflict() {
        assert!(Cli::try_parse_from(["folio-curator", "update-author", "1", "--owner", "--not-owner"]).is_err());
    }
}
