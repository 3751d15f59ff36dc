use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use timeschd_client::{HtmlScheduleParser, ReqwestFetcher};
use timeschd_core::config::{
    CrawlConfig, DEFAULT_CATALOG_URL, DEFAULT_CSV_PATH, DEFAULT_JSON_PATH, DEFAULT_LEVEL_LIMIT,
    DEFAULT_QUARTER,
};
use timeschd_core::export;
use timeschd_core::{CrawlService, ThrottleConfig, ThrottledFetcher, TracingCrawlReporter};

#[derive(Parser)]
#[command(
    name = "timeschd",
    version,
    about = "Collect in-person course sections from the UW time schedule"
)]
struct Cli {
    #[command(flatten)]
    site: SiteArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SiteArgs {
    /// Quarter code used to build the schedule root URL (e.g. "WIN2021")
    #[arg(short, long, env = "TIMESCHD_QUARTER", default_value = DEFAULT_QUARTER, global = true)]
    quarter: String,

    /// Schedule root URL; overrides --quarter
    #[arg(long, env = "TIMESCHD_ROOT_URL", global = true)]
    root_url: Option<String>,

    /// Course catalog root URL
    #[arg(long, env = "TIMESCHD_CATALOG_URL", default_value = DEFAULT_CATALOG_URL, global = true)]
    catalog_url: String,

    /// Highest course level to collect
    #[arg(short, long, env = "TIMESCHD_LEVEL_LIMIT", default_value_t = DEFAULT_LEVEL_LIMIT, global = true)]
    level_limit: u32,

    /// Request timeout in seconds
    #[arg(long, env = "TIMESCHD_TIMEOUT", default_value_t = 30, global = true)]
    timeout: u64,

    /// Minimum delay between two requests to the same host, in milliseconds
    #[arg(long, env = "TIMESCHD_DELAY_MS", default_value_t = 250, global = true)]
    delay_ms: u64,

    /// Random extra delay added to --delay-ms, in milliseconds
    #[arg(long, env = "TIMESCHD_JITTER_MS", default_value_t = 0, global = true)]
    jitter_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every department and write the JSON and CSV files
    Crawl {
        /// JSON output path
        #[arg(long, env = "TIMESCHD_JSON", default_value = DEFAULT_JSON_PATH)]
        json: PathBuf,

        /// CSV output path
        #[arg(long, env = "TIMESCHD_CSV", default_value = DEFAULT_CSV_PATH)]
        csv: PathBuf,

        /// Abort on the first department that fails instead of skipping it
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// List the department links found on the schedule root page
    Links,

    /// Scan a single department and print its in-person sections as JSON
    Department {
        /// Department page, e.g. "math.html"
        link: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("timeschd=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = build_config(&cli.site);
    if let Commands::Crawl { json, csv, strict } = &cli.command {
        config.json_path = json.clone();
        config.csv_path = csv.clone();
        config.strict = *strict;
    }
    config.validate().context("Invalid configuration")?;

    let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(cli.site.timeout))
        .context("Failed to create HTTP client")?;
    let throttle = ThrottleConfig::new(Duration::from_millis(cli.site.delay_ms))
        .with_jitter(Duration::from_millis(cli.site.jitter_ms));
    let svc = CrawlService::new(
        ThrottledFetcher::new(fetcher, throttle),
        HtmlScheduleParser::new(),
        config,
    );

    match cli.command {
        Commands::Crawl { .. } => cmd_crawl(&svc).await?,
        Commands::Links => cmd_links(&svc).await?,
        Commands::Department { link } => cmd_department(&svc, &link).await?,
    }

    Ok(())
}

fn build_config(site: &SiteArgs) -> CrawlConfig {
    let mut config = match &site.root_url {
        Some(root_url) => CrawlConfig {
            root_url: root_url.clone(),
            ..CrawlConfig::default()
        },
        None => CrawlConfig::for_quarter(&site.quarter),
    };
    config.catalog_url = site.catalog_url.clone();
    config.level_limit = site.level_limit;
    config
}

type Service = CrawlService<ThrottledFetcher<ReqwestFetcher>, HtmlScheduleParser>;

async fn cmd_crawl(svc: &Service) -> Result<()> {
    tracing::info!(root = %svc.config().root_url, "Starting crawl");

    let report = svc
        .crawl(&TracingCrawlReporter)
        .await
        .context("Crawl aborted")?;

    let config = svc.config();
    export::write_outputs(&report.offerings, &config.json_path, &config.csv_path)
        .context("Failed to write output files")?;

    if !report.failed.is_empty() {
        eprintln!("Skipped {} department(s):", report.failed.len());
        for failed in &report.failed {
            eprintln!("  {}: {}", failed.link, failed.error);
        }
    }

    println!(
        "Wrote {} courses ({} sections) to {} and {}",
        report.offerings.len(),
        report.offerings.section_count(),
        config.json_path.display(),
        config.csv_path.display()
    );

    Ok(())
}

async fn cmd_links(svc: &Service) -> Result<()> {
    let links = svc
        .discover_departments()
        .await
        .context("Failed to fetch the schedule root page")?;

    if links.is_empty() {
        println!("No department links found at {}", svc.config().root_url);
        return Ok(());
    }

    for link in &links {
        println!("{link}");
    }
    println!("\nTotal: {} departments", links.len());

    Ok(())
}

async fn cmd_department(svc: &Service, link: &str) -> Result<()> {
    let scan = svc
        .scan_department(link)
        .await
        .with_context(|| format!("Failed to scan {link}"))?;

    tracing::info!(
        courses = scan.offerings.len(),
        sections = scan.offerings.section_count(),
        stopped_at = ?scan.stopped_at,
        "Department scanned"
    );

    println!("{}", export::to_json_string(&scan.offerings)?);

    Ok(())
}
