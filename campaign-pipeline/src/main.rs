use anyhow::Context;
use campaign_pipeline::display::{render_bulk_report, render_delivery, render_overview, render_package, render_performance};
use campaign_pipeline::{
    delivery_log, load_contacts, AppConfig, CampaignLoader, ConfigNeeds, Contact, ContentGenerator,
    ContentStore, DeliveryOrchestrator, OpenAiAdapter, PerformanceAggregator,
};
use clap::{Parser, Subcommand};
use email_delivery::ResendClient;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, Level};

#[derive(Parser, Debug)]
#[command(name = "campaign", version, about = "Generate, send and analyze persona newsletter campaigns")]
struct Cli {
    #[arg(long, global = true, help = "Directory holding the JSON logs (default: $CAMPAIGN_DATA_DIR or .)")]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a content package for a topic and append it to the content log
    Generate {
        /// Prompted for on stdin when omitted
        topic: Option<String>,
    },
    /// Show the latest campaign and its personas
    Overview,
    /// Send the latest campaign to every contact
    Send,
    /// Send the latest campaign to a single contact
    SendOne {
        #[arg(long)]
        email: String,
        #[arg(long)]
        persona: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Aggregate the delivery log into a per-persona snapshot
    Analyze {
        #[arg(long, default_value_t = false, help = "Skip the AI summary")]
        no_summary: bool,
    },
}

impl Commands {
    fn config_needs(&self) -> ConfigNeeds {
        match self {
            Commands::Generate { .. } => ConfigNeeds {
                generation: true,
                delivery: false,
            },
            Commands::Overview => ConfigNeeds::default(),
            Commands::Send | Commands::SendOne { .. } => ConfigNeeds {
                generation: false,
                delivery: true,
            },
            Commands::Analyze { no_summary } => ConfigNeeds {
                generation: !no_summary,
                delivery: false,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env(cli.command.config_needs(), cli.data_dir)?;
    info!("Using data directory {}", config.data_dir.display());

    match cli.command {
        Commands::Generate { topic } => generate(&config, topic).await,
        Commands::Overview => overview(&config).await,
        Commands::Send => send_all(&config).await,
        Commands::SendOne {
            email,
            persona,
            first_name,
            last_name,
        } => {
            let contact = Contact::new(&email, &first_name, &last_name, &persona);
            send_one(&config, contact).await
        }
        Commands::Analyze { no_summary } => analyze(&config, no_summary).await,
    }
}

async fn generate(config: &AppConfig, topic: Option<String>) -> anyhow::Result<()> {
    let topic = match topic {
        Some(topic) => topic,
        None => prompt_for_topic().await?,
    };

    let generation = config.generation()?;
    let adapter = Arc::new(OpenAiAdapter::new(generation.clone())?);
    let generator = ContentGenerator::from_config(adapter, generation);

    let package = generator.build_package(&topic).await?;
    println!("{}", render_package(&package));

    let store = ContentStore::new(&config.paths.content_log);
    let total = store.append(topic.trim(), &package).await?;
    println!("✅ Content saved to {}", store.path().display());
    println!("📂 Total saved entries: {}", total);
    Ok(())
}

async fn prompt_for_topic() -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter a topic: ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read topic from stdin")?;
    Ok(line.trim().to_string())
}

async fn overview(config: &AppConfig) -> anyhow::Result<()> {
    let loader = CampaignLoader::new(ContentStore::new(&config.paths.content_log));
    println!("{}", render_overview(&loader.overview().await?));
    Ok(())
}

async fn orchestrator(config: &AppConfig) -> anyhow::Result<DeliveryOrchestrator> {
    let delivery = config.delivery()?;
    let campaign = CampaignLoader::new(ContentStore::new(&config.paths.content_log))
        .load_latest_campaign()
        .await?;

    let sender = Arc::new(ResendClient::new(delivery.clone())?);
    Ok(DeliveryOrchestrator::new(
        campaign,
        sender,
        delivery.from_email.clone(),
        delivery_log(&config.paths.delivery_log),
    ))
}

async fn send_all(config: &AppConfig) -> anyhow::Result<()> {
    let orchestrator = orchestrator(config).await?;
    let contacts = load_contacts(&config.paths.contacts).await?;
    info!("Sending to {} contacts", contacts.len());

    let report = orchestrator.orchestrate_bulk(&contacts).await?;
    print!("{}", render_bulk_report(&report));
    Ok(())
}

async fn send_one(config: &AppConfig, contact: Contact) -> anyhow::Result<()> {
    let orchestrator = orchestrator(config).await?;
    let entry = orchestrator.send_to_contact(&contact).await?;
    println!("{}", render_delivery(&entry));
    Ok(())
}

async fn analyze(config: &AppConfig, no_summary: bool) -> anyhow::Result<()> {
    let mut aggregator = PerformanceAggregator::new(
        delivery_log(&config.paths.delivery_log),
        &config.paths.performance,
    );

    if !no_summary {
        let generation = config.generation()?;
        let adapter = Arc::new(OpenAiAdapter::new(generation.clone())?);
        aggregator = aggregator.with_summary(
            adapter,
            Some(generation.summary_model.clone()),
            generation.summary_max_tokens,
        );
    }

    let report = aggregator.aggregate().await?;
    print!("{}", render_performance(&report));
    println!("✅ Performance snapshot saved to {}", aggregator.snapshot_path().display());
    Ok(())
}
