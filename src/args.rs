use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flora-harvest")]
#[command(about = "Harvests plant pages: attribute tables, description, family and images")]
#[command(version)]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape item pages and download their images
    Scrape {
        /// Page URLs to scrape
        urls: Vec<String>,

        /// File with one page URL per line
        #[arg(short, long)]
        urls_file: Option<PathBuf>,

        /// Number of concurrent image downloads per page
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Number of pages scraped at once
        #[arg(short, long)]
        pages: Option<usize>,

        /// Directory under which one folder per page is created
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Collect item page URLs from a scrolling listing page (needs WebDriver)
    Discover {
        /// Listing page URL
        listing_url: String,

        /// File the URLs are written to
        #[arg(short, long, default_value = "plant_urls.txt")]
        output: PathBuf,

        /// WebDriver server URL
        #[arg(long)]
        webdriver_url: Option<String>,
    },
}
