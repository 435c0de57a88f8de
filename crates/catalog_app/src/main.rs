mod categories;
mod cli;
mod config;
mod driver;
mod effects;
mod logging;
mod render;

use std::time::Duration;

use anyhow::{bail, Context};
use catalog_core::{CatalogState, Msg, PollerPhase, TaskId};
use catalog_engine::EngineHandle;
use catalog_logging::catalog_info;
use clap::Parser;

use crate::cli::{Args, BrowseArgs, Command};
use crate::config::AppConfig;
use crate::driver::Driver;
use crate::effects::EffectRunner;

/// Scrape jobs run remotely for minutes; this bounds how long we follow one.
const JOB_WAIT: Duration = Duration::from_secs(15 * 60);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    logging::initialize(config.log_destination, config.level());
    catalog_info!("Using catalog at {}", config.base_url);

    let engine = EngineHandle::new(config.engine_settings()).context("starting engine")?;
    let mut driver = Driver::new(EffectRunner::new(engine));

    let result = match &args.command {
        Command::Browse(browse) => browse_cmd(&mut driver, &config, browse),
        Command::Stats => stats_cmd(&mut driver, &config),
        Command::Scrape { category, max } => {
            driver.dispatch(Msg::ScrapeRequested {
                category: category.clone(),
                max_images: *max,
            });
            follow_job(&mut driver)
        }
        Command::Track { task_id } => {
            driver.dispatch(Msg::TrackTask {
                task_id: TaskId::new(task_id.as_str()),
            });
            follow_job(&mut driver)
        }
    };

    driver.shutdown();
    result
}

fn feed_idle(state: &CatalogState) -> bool {
    !state.feed().is_loading()
}

fn browse_cmd(driver: &mut Driver, config: &AppConfig, browse: &BrowseArgs) -> anyhow::Result<()> {
    let patch = browse.patch();
    if patch.is_empty() {
        driver.dispatch(Msg::Init);
    } else {
        driver.dispatch(Msg::FiltersChanged(patch));
    }
    wait(driver, config.request_deadline(), feed_idle)?;

    for _ in 1..browse.pages {
        if !driver.dispatch(Msg::LoadMoreRequested) {
            break;
        }
        wait(driver, config.request_deadline(), feed_idle)?;
    }

    let view = driver.view();
    print!("{}", render::render_feed(&view));
    match view.feed_error {
        Some(err) => bail!(err),
        None => Ok(()),
    }
}

fn stats_cmd(driver: &mut Driver, config: &AppConfig) -> anyhow::Result<()> {
    driver.dispatch(Msg::StatsRequested);
    wait(driver, config.request_deadline(), |state| {
        state.stats().is_some() || state.stats_error().is_some()
    })?;
    let view = driver.view();
    print!("{}", render::render_stats(&view, &config.category_table()));
    match view.stats_error {
        Some(err) => bail!(err),
        None => Ok(()),
    }
}

fn follow_job(driver: &mut Driver) -> anyhow::Result<()> {
    wait(driver, JOB_WAIT, |state| {
        !state.poller().is_active() && !state.poller().images_loading()
    })?;
    let view = driver.view();
    print!("{}", render::render_scrape(&view));
    match (view.scrape.phase, view.scrape.error) {
        (PollerPhase::Completed, _) => Ok(()),
        (PollerPhase::NotFound, _) => bail!("the catalog service no longer knows this task"),
        (_, Some(err)) => bail!(err),
        (phase, None) => bail!("scrape ended in phase {:?}", phase),
    }
}

fn wait(
    driver: &mut Driver,
    timeout: Duration,
    done: impl Fn(&CatalogState) -> bool,
) -> anyhow::Result<()> {
    if driver.run_until(timeout, done) {
        Ok(())
    } else {
        bail!("no answer from the catalog service within {:?}", timeout)
    }
}
