use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Cell, Color, Table};
use console::style;
use stacknag::aws::{load_sdk_config, AwsStorageApi, CloudWatchSink, OpsWorksStackApi};
use stacknag::config::{init_config, PricingConfig, Settings};
use stacknag::cost::FleetSummary;
use stacknag::exit_codes::exit_code_for_anyhow;
use stacknag::notify::WebhookNotifier;
use stacknag::pricing::{
    build_index, CatalogSource, DirectoryCatalogSource, HttpCatalogSource, PriceIndex,
};
use stacknag::report::{Driver, Invocation, Outcome};
use stacknag::utils::{format_hourly, read_payload};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stacknag")]
#[command(
    about = "Hourly cost reports for OpsWorks stacks",
    long_about = "stacknag prices every OpsWorks stack in the account and reports it.\n\nModes:\n  - Status report posted to a webhook\n  - Fleet and per-stack CloudWatch metrics\n  - CodeBuild event relay\n\nThe price index is built offline with `stacknag build-index`."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one invocation payload (status action, metrics action, or CodeBuild event)
    Handle {
        /// Payload as inline JSON
        #[arg(long, conflicts_with = "event_file")]
        event: Option<String>,
        /// Payload file (`-` for stdin, the default)
        #[arg(long)]
        event_file: Option<PathBuf>,
    },
    /// Post the stack status report
    Status,
    /// Publish fleet and per-stack metrics
    Metrics,
    /// Print per-stack hourly costs without notifying anybody
    Costs {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    /// Download the pricing catalog and rebuild the price index
    BuildIndex {
        /// Pricing rules TOML
        #[arg(long)]
        pricing_config: Option<PathBuf>,
        /// Read `{offer_code}.json` catalogs from this directory instead of downloading
        #[arg(long)]
        catalog_dir: Option<PathBuf>,
        /// Index output path (defaults to the configured index path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show price index contents
    ShowIndex {
        #[arg(long)]
        category: Option<String>,
        /// Look up one class within `--category`
        #[arg(long, requires = "category")]
        class: Option<String>,
    },
    /// Write the default pricing rules
    Init {
        #[arg(short, long, default_value = ".stacknag.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(exit_code_for_anyhow(&e));
    }
}

fn init_logging(verbose: bool, json: bool) {
    // Suppress INFO by default, RUST_LOG overrides
    let filter = if verbose {
        EnvFilter::new("warn,stacknag=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings;
    match cli.command {
        Commands::Init { output } => init_config(&output),
        Commands::BuildIndex {
            pricing_config,
            catalog_dir,
            output,
        } => {
            let output = output.unwrap_or_else(|| settings.price_index_path.clone());
            rebuild_index(pricing_config.as_deref(), catalog_dir, &output, cli.verbose).await
        }
        Commands::ShowIndex { category, class } => {
            let index = PriceIndex::load(&settings.price_index_path)?;
            show_index(&index, category.as_deref(), class.as_deref())
        }
        Commands::Handle { event, event_file } => {
            let payload = match (event, event_file) {
                (Some(inline), _) => inline,
                (None, Some(path)) => read_payload(&path)?,
                (None, None) => read_payload(Path::new("-"))?,
            };
            let invocation = Invocation::from_json_str(&payload)?;
            let driver = build_driver(settings).await?;
            report(driver.handle(&invocation).await?);
            Ok(())
        }
        Commands::Status => {
            let driver = build_driver(settings).await?;
            report(driver.handle(&Invocation::StatusReport).await?);
            Ok(())
        }
        Commands::Metrics => {
            let driver = build_driver(settings).await?;
            report(driver.handle(&Invocation::Metrics).await?);
            Ok(())
        }
        Commands::Costs { output } => {
            let driver = build_driver(settings).await?;
            let summary = driver.fleet_summary().await?;
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Text => print_costs(&summary),
            }
            Ok(())
        }
    }
}

/// Wire the driver to AWS. The price index is loaded first: without it no
/// report mode can run.
async fn build_driver(settings: Settings) -> Result<Driver> {
    let index = PriceIndex::load(&settings.price_index_path)?;
    let sdk_config = load_sdk_config(&settings).await;

    Ok(Driver::new(
        settings,
        Arc::new(index),
        Arc::new(OpsWorksStackApi::new(&sdk_config)),
        Arc::new(AwsStorageApi::new(&sdk_config)),
        Arc::new(CloudWatchSink::new(&sdk_config)),
        Arc::new(WebhookNotifier::new()?),
    ))
}

async fn rebuild_index(
    pricing_config: Option<&Path>,
    catalog_dir: Option<PathBuf>,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    let config = PricingConfig::load(pricing_config)?;
    let source: Box<dyn CatalogSource> = match catalog_dir {
        Some(dir) => Box::new(DirectoryCatalogSource::new(dir)),
        None => Box::new(HttpCatalogSource::new(&config.catalog_base_url)?.with_progress(!verbose)),
    };

    let index = build_index(&config, source.as_ref(), output)
        .await
        .with_context(|| format!("Failed to build price index at {}", output.display()))?;

    println!("{} {}", style("Price index written:").green().bold(), output.display());
    for (category, count) in index.summary() {
        println!("  {}: {} classes", category, count);
    }
    Ok(())
}

fn show_index(index: &PriceIndex, category: Option<&str>, class: Option<&str>) -> Result<()> {
    match (category, class) {
        (Some(category), Some(class)) => {
            let price = index.lookup(category, class)?;
            println!("{}/{}: {}", category, class, format_hourly(price));
        }
        (Some(category), None) => {
            let prices = index
                .category(category)
                .with_context(|| format!("Category {} is not in the price index", category))?;
            let mut table = Table::new();
            table.set_header(vec!["Class", "Hourly"]);
            for (class, price) in prices {
                table.add_row(vec![Cell::new(class), Cell::new(format!("{:.4}", price))]);
            }
            println!("{}", table);
        }
        _ => {
            if index.is_empty() {
                println!("{}", style("Price index is empty").yellow());
            }
            for (category, count) in index.summary() {
                println!("{}: {} classes", style(category).bold(), count);
            }
        }
    }
    Ok(())
}

fn print_costs(summary: &FleetSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Stack", "Online", "EC2", "RDS", "EBS", "S3", "Total/hr"]);

    for stack in &summary.stacks {
        let online = if stack.is_running() {
            Cell::new(stack.online_instances).fg(Color::Green)
        } else {
            Cell::new(stack.online_instances).fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&stack.name),
            online,
            Cell::new(format!("{:.4}", stack.cost.compute)),
            Cell::new(format!("{:.4}", stack.cost.database)),
            Cell::new(format!("{:.4}", stack.cost.block_storage)),
            Cell::new(format!("{:.4}", stack.cost.object_storage)),
            Cell::new(format_hourly(stack.cost.total())),
        ]);
    }

    println!("{}", table);
    println!(
        "{} of {} stacks running, {} {}",
        summary.running_count(),
        summary.total_count(),
        style("total").dim(),
        style(format_hourly(summary.totals().total())).yellow()
    );
}

fn report(outcome: Outcome) {
    match outcome {
        Outcome::StatusPosted { message } => {
            println!("{}", style("Status posted").green().bold());
            println!("{}", message);
        }
        Outcome::MetricsPublished {
            batches,
            data_points,
        } => {
            println!(
                "{} {} data points in {} batches",
                style("Published").green().bold(),
                data_points,
                batches
            );
        }
        Outcome::BuildEventRelayed { message } => {
            println!("{} {}", style("Relayed:").green().bold(), message);
        }
    }
}
