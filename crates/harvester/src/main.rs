//! Art Stuff Harvester
//!
//! Fills the local `paintings` catalogue from the museum APIs:
//! 1. Runs each museum's search terms page by page
//! 2. Upserts records that have an image and a title
//! 3. Writes a `harvest_logs` row per museum
//!
//! Also prints catalogue counts and purges stale cached responses.

mod harvester;
mod terms;

use anyhow::Context;
use artstuff_common::{
    cache::create_cache,
    config::AppConfig,
    db::DbPool,
    logging::init_tracing,
    museums::{create_sources, MuseumClient},
    Museum, Repository, VERSION,
};
use artstuff_migration::{Migrator, MigratorTrait};
use clap::Parser;
use harvester::{Harvester, Target};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(about = "Harvest museum paintings into the Art Stuff catalogue", long_about = None)]
struct Cli {
    /// `all`, or one of aic, rijks, met, cleveland, harvard, europeana, smithsonian, smk
    #[arg(default_value = "all")]
    target: String,

    /// Harvest popular artists from AIC, Cleveland and the Met
    #[arg(long, conflicts_with_all = ["stats", "purge_cache"])]
    artists: bool,

    /// Print painting counts per museum and exit
    #[arg(long, conflicts_with = "purge_cache")]
    stats: bool,

    /// Delete cached museum responses older than `cache.retention_days` and exit
    #[arg(long)]
    purge_cache: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Harvest(Target),
    Stats,
    PurgeCache,
}

impl Cli {
    fn command(&self) -> anyhow::Result<Command> {
        if self.stats {
            return Ok(Command::Stats);
        }
        if self.purge_cache {
            return Ok(Command::PurgeCache);
        }
        if self.artists {
            return Ok(Command::Harvest(Target::Artists));
        }
        if self.target.eq_ignore_ascii_case("all") {
            return Ok(Command::Harvest(Target::All));
        }

        let museum: Museum = self.target.parse()?;
        Ok(Command::Harvest(Target::Museum(museum)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command()?;

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.observability);

    info!("Starting Art Stuff Harvester v{}", VERSION);

    let db = DbPool::new(&config.database).await?;
    if config.database.run_migrations {
        info!("Running migrations...");
        Migrator::up(db.write(), None).await?;
    }
    let repo = Repository::new(db);
    let harvester = Harvester::new(repo.clone(), config.harvest.clone());

    match command {
        Command::Stats => {
            let stats = harvester.stats().await?;
            println!("Current painting counts:");
            for (museum, count) in &stats {
                println!("  {}: {}", museum, count);
            }
            println!("  TOTAL: {}", stats.iter().map(|(_, c)| c).sum::<i64>());
        }
        Command::PurgeCache => {
            let removed = harvester.purge_cache(config.cache.retention_days).await?;
            println!("Removed {} cached responses", removed);
        }
        Command::Harvest(target) => {
            let cache = create_cache(&config.cache, &repo).await?;
            let client = MuseumClient::new(
                config.museums.timeout(),
                cache,
                config.cache.ttl(),
                config.cache.key_prefix.clone(),
            )?;
            let sources = create_sources(&config.museums, client);

            let jobs = harvester.jobs(target, &sources);
            if jobs.is_empty() {
                anyhow::bail!("nothing to harvest for {:?}, check museums.enabled", target);
            }

            let reports = harvester.run_all(&jobs).await?;

            println!("Harvest complete");
            for report in &reports {
                println!("  {}: {} ({})", report.museum, report.harvested, report.status.as_str());
            }
            println!(
                "  Grand total: {} paintings",
                reports.iter().map(|r| r.harvested).sum::<usize>()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> anyhow::Result<Command> {
        let mut argv = vec!["harvester"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)?.command()
    }

    #[test]
    fn test_cli_commands() {
        assert_eq!(command(&[]).unwrap(), Command::Harvest(Target::All));
        assert_eq!(command(&["ALL"]).unwrap(), Command::Harvest(Target::All));
        assert_eq!(
            command(&["smk"]).unwrap(),
            Command::Harvest(Target::Museum(Museum::Smk))
        );
        assert_eq!(command(&["--artists"]).unwrap(), Command::Harvest(Target::Artists));
        assert_eq!(command(&["--stats"]).unwrap(), Command::Stats);
        assert_eq!(command(&["--purge-cache"]).unwrap(), Command::PurgeCache);
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(command(&["whitney"]).is_err());
        assert!(command(&["--stats", "--artists"]).is_err());
    }
}
