use clap::Parser;
use flora_harvest::discovery::{ListingDiscovery, write_url_file};
use flora_harvest::{Harvest, HarvestConfig, PageReport, read_url_file};
use std::path::PathBuf;
use std::process::ExitCode;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match HarvestConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => HarvestConfig::default(),
    };

    let result = match args.command {
        Command::Scrape {
            urls,
            urls_file,
            concurrency,
            pages,
            output,
        } => scrape(config, urls, urls_file, concurrency, pages, output).await,
        Command::Discover {
            listing_url,
            output,
            webdriver_url,
        } => discover(config, &listing_url, output, webdriver_url).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn scrape(
    mut config: HarvestConfig,
    mut urls: Vec<String>,
    urls_file: Option<PathBuf>,
    concurrency: Option<usize>,
    pages: Option<usize>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = urls_file {
        urls.extend(read_url_file(path)?);
    }
    if urls.is_empty() {
        return Err("no page URLs given (pass URLs or --urls-file)".into());
    }

    if let Some(value) = concurrency {
        config.max_concurrency = value;
    }
    if let Some(value) = pages {
        config.page_concurrency = value;
    }
    if let Some(root) = output {
        config.destination_root = root;
    }

    let total = urls.len();
    let start_time = std::time::Instant::now();
    let mut rx = Harvest::new(urls).with_config(config).generate().await?;

    let mut failed = 0;
    while let Some(report) = rx.recv().await {
        if report.outcome.is_err() {
            failed += 1;
        }
        print_report(&report)?;
    }

    ::log::info!(
        "Harvested {} pages ({} failed) in {:.2} seconds",
        total,
        failed,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// One JSON object per line on stdout
fn print_report(report: &PageReport) -> Result<(), serde_json::Error> {
    let line = match &report.outcome {
        Ok(page) => serde_json::to_string(page)?,
        Err(e) => serde_json::json!({ "url": report.url, "error": e.to_string() }).to_string(),
    };
    println!("{line}");
    Ok(())
}

async fn discover(
    mut config: HarvestConfig,
    listing_url: &str,
    output: PathBuf,
    webdriver_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Flag beats environment beats configuration file
    if let Ok(url) = std::env::var("WEBDRIVER_URL") {
        if !url.is_empty() {
            config.discovery.webdriver_url = url;
        }
    }
    if let Some(url) = webdriver_url {
        config.discovery.webdriver_url = url;
    }

    let discovery = ListingDiscovery::new(config.discovery, listing_url)?;
    let urls = discovery.discover().await?;
    write_url_file(&output, &urls)?;

    ::log::info!("Wrote {} URLs to {}", urls.len(), output.display());
    Ok(())
}
