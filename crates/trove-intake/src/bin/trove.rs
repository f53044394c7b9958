//! Trove operator CLI.
//!
//! Thin presentation shell over the intake workflow; all pipeline logic
//! lives in the library crates.
//!
//! Usage:
//!   trove init-db
//!   trove found "<raw record text>" [--contact <phone>] [--image <path>]
//!   trove lost "<report text>" [--location <loc>] [--category <cat>] [--type <ty>] [-k <n>]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};

use trove_db::{create_pool, init_schema, PgFoundItemRepository};
use trove_inference::OpenAIBackend;
use trove_intake::{
    load_catalog, validate_email, validate_phone, IntakeConfig, IntakeService, ReportChoices,
    DEFAULT_MATCH_COUNT,
};

#[derive(Debug)]
enum Command {
    InitDb,
    Describe {
        text: String,
    },
    Found {
        text: String,
        contact: String,
        image: String,
    },
    Lost {
        text: String,
        choices: ReportChoices,
        k: i64,
    },
}

fn usage() -> ! {
    eprintln!(
        "Usage:\n  trove init-db\n  trove describe <intake notes>\n  \
         trove found <text> [--contact <phone>] [--image <path>]\n  \
         trove lost <text> [--location <loc>] [--category <cat>] [--type <ty>] [-k <n>]"
    );
    std::process::exit(2);
}

fn parse_args() -> Command {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else { usage() };

    match command.as_str() {
        "init-db" => Command::InitDb,
        "describe" => {
            let Some(text) = args.get(1).cloned() else { usage() };
            Command::Describe { text }
        }
        "found" => {
            let Some(text) = args.get(1).cloned() else { usage() };
            let mut contact = String::new();
            let mut image = String::new();
            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--contact" => {
                        i += 1;
                        contact = args.get(i).cloned().unwrap_or_else(|| usage());
                    }
                    "--image" => {
                        i += 1;
                        image = args.get(i).cloned().unwrap_or_else(|| usage());
                    }
                    _ => usage(),
                }
                i += 1;
            }
            Command::Found {
                text,
                contact,
                image,
            }
        }
        "lost" => {
            let Some(text) = args.get(1).cloned() else { usage() };
            let mut choices = ReportChoices::default();
            let mut k = DEFAULT_MATCH_COUNT;
            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--location" => {
                        i += 1;
                        choices.location = args.get(i).cloned();
                    }
                    "--category" => {
                        i += 1;
                        choices.category = args.get(i).cloned();
                    }
                    "--type" => {
                        i += 1;
                        choices.item_type = args.get(i).cloned();
                    }
                    "-k" => {
                        i += 1;
                        k = args
                            .get(i)
                            .and_then(|v| v.parse().ok())
                            .unwrap_or_else(|| usage());
                    }
                    _ => usage(),
                }
                i += 1;
            }
            Command::Lost { text, choices, k }
        }
        _ => usage(),
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = IntakeConfig::from_env().context("loading configuration")?;
    let pool = create_pool(&config.database_url)
        .await
        .context("connecting to database")?;

    if let Command::InitDb = command {
        init_schema(&pool).await.context("initializing schema")?;
        println!("Schema initialized.");
        return Ok(());
    }

    let catalog = load_catalog(&config.tags_path).context("loading tag catalog")?;
    if catalog.is_empty() {
        bail!("tag catalog at {} is empty", config.tags_path.display());
    }

    let backend = Arc::new(OpenAIBackend::new(config.openai)?);
    let repo = Arc::new(PgFoundItemRepository::new(pool));
    let service = IntakeService::new(backend.clone(), backend, repo, catalog);

    match command {
        Command::InitDb => unreachable!("handled above"),
        Command::Describe { text } => {
            let block = service.describe_found_item(&text).await?;
            println!("{}", block);
        }
        Command::Found {
            text,
            contact,
            image,
        } => {
            if !contact.is_empty() && !validate_phone(&contact) && !validate_email(&contact) {
                bail!("contact must be a 10-digit phone number or an email address");
            }
            let record = service.standardize(&text).await?;
            let id = service.insert_found(&record, &contact, &image).await?;
            println!("Saved found item {} ({})", id, record.item_category);
        }
        Command::Lost { text, choices, k } => {
            let record = service.report_lost(&text, &choices).await?;
            let matches = service.search_matches(&record, k).await?;
            if matches.is_empty() {
                println!("No matches found.");
            }
            for m in &matches {
                println!(
                    "#{}  similarity {:.4}  category {}  location {}",
                    m.id,
                    m.similarity,
                    m.item_category,
                    m.subway_location.join(", ")
                );
                println!("    {}", m.description);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(parse_args()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
