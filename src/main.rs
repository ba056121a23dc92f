use clap::Parser;

mod artifactory;
mod cli;
mod config;
mod db;
mod error;
mod http;
mod models;
mod notes;
mod sync;
#[cfg(test)]
mod test_support;

use cli::{Cli, Commands};
use config::Config;
use error::{AppError, Result};
use models::NewVersion;
use notes::html_to_text;
use sync::ReleaseSync;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Warnings and errors only unless --verbose
    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration, writing defaults on first run
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Open the store and build the remote clients
    let sync = ReleaseSync::from_config(&config).await?;

    if let Err(e) = run(cli.command, &sync).await {
        eprintln!("Error: {}", e);
        if e.is_retryable() {
            eprintln!("The remote request failed; running the command again may succeed.");
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, sync: &ReleaseSync) -> Result<()> {
    match command {
        Commands::AddVersion {
            name,
            release_date,
            inactive,
        } => {
            // Refuse duplicates before hitting the unique constraint
            if sync.repository.get_version_by_name(name.trim()).await?.is_some() {
                return Err(AppError::Validation(format!(
                    "version {} already exists",
                    name.trim()
                )));
            }
            let version = sync
                .repository
                .insert_version(NewVersion {
                    release_date,
                    active: !inactive,
                    ..NewVersion::new(name)
                })
                .await?;
            println!("Added {} (id {}, slug {})", version.name, version.id, version.slug);
        }

        Commands::List => {
            let versions = sync.repository.get_all_versions().await?;
            if versions.is_empty() {
                println!("No versions yet. Add one with `release-sync add-version <NAME>`.");
            }
            for version in versions {
                let files = sync.repository.get_version_files(version.id).await?;
                // id, name, release date, file count, flags
                println!(
                    "{:>4}  {:<24} {:<10} {} file(s){}{}",
                    version.id,
                    version.name,
                    version
                        .release_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    files.len(),
                    if version.is_beta() { "  [beta]" } else { "" },
                    if version.active { "" } else { "  [inactive]" },
                );
            }
        }

        Commands::Downloads { version_id } => {
            // List, fetch metadata, then upsert by checksum
            let files = sync.sync_release_downloads(version_id).await?;
            println!("Stored {} download(s)", files.len());
            for file in files {
                println!("  {:<8} {}  {}", file.operating_system, file.checksum, file.url);
            }
        }

        Commands::Notes { version_id } => {
            let rendered = sync.store_release_notes(version_id).await?;
            println!(
                "Stored release notes under {} ({} bytes)",
                rendered.cache_key,
                rendered.content_html.len()
            );
        }

        Commands::Show { version_id, width } => {
            let version = sync.repository.get_version(version_id).await?;
            println!("{} ({})", version.name, version.slug);
            if let Some(date) = version.release_date {
                println!("Released {}", date);
            }

            let files = sync.repository.get_version_files(version.id).await?;
            println!("\nDownloads:");
            if files.is_empty() {
                println!("  none stored");
            }
            for file in files {
                println!(
                    "  {:<28} {:<8} {}",
                    file.display_name, file.operating_system, file.checksum
                );
            }

            // Notes are stored as HTML; render them for the terminal
            println!("\nRelease notes:");
            match sync
                .repository
                .get_rendered_content(&version.release_notes_cache_key())
                .await?
            {
                Some(content) => println!("{}", html_to_text(&content.content_html, width)?),
                None => println!("  not stored"),
            }
        }
    }

    Ok(())
}
