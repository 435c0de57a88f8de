//! Command-line arguments, defined with clap derive macros.

use std::path::PathBuf;

use catalog_core::{FilterPatch, SortOption, Source, MAX_SCRAPE_IMAGES};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;

/// Browse the image catalog and run scrape jobs against it.
#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(author, version, about)]
pub struct Args {
    /// Configuration file (RON)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Catalog API base url, overriding the config file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log level (off, error, warn, info, debug, trace), overriding the config file
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List images matching the given filters
    Browse(BrowseArgs),
    /// Start a scrape job and wait for its images
    Scrape {
        /// Category to scrape
        category: String,
        /// Number of images to download (1-1000)
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=MAX_SCRAPE_IMAGES as i64))]
        max: u32,
    },
    /// Follow a scrape job started elsewhere
    Track {
        /// Task id returned by the service
        task_id: String,
    },
    /// Show catalog statistics
    Stats,
}

#[derive(clap::Args, Debug)]
pub struct BrowseArgs {
    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    /// Category to list ("all" for every category)
    #[arg(long)]
    pub category: Option<String>,

    /// Source filter: all, web, social or local
    #[arg(long)]
    pub source: Option<Source>,

    /// Sort: newest, oldest, a-z, popular or downloads
    #[arg(long)]
    pub sort: Option<SortOption>,

    /// Earliest scrape date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest scrape date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Number of pages to load
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
}

impl BrowseArgs {
    pub fn patch(&self) -> FilterPatch {
        let mut patch = FilterPatch::default();
        if let Some(search) = &self.search {
            patch = patch.search(search.clone());
        }
        if let Some(category) = &self.category {
            patch = patch.category(category.clone());
        }
        if let Some(source) = self.source {
            patch = patch.source(source);
        }
        if let Some(sort) = self.sort {
            patch = patch.sort(sort);
        }
        if self.from.is_some() {
            patch = patch.date_from(self.from);
        }
        if self.to.is_some() {
            patch = patch.date_to(self.to);
        }
        patch
    }
}
