use std::fmt::Write;

use catalog_core::{CatalogStats, CatalogViewModel, CountEntry, ImageRecord, PollerPhase};

use crate::categories::CategoryTable;

pub fn render_feed(view: &CatalogViewModel) -> String {
    let mut out = String::new();
    for image in &view.images {
        push_image(&mut out, image);
    }
    let tail = if view.loading {
        "loading"
    } else if view.has_more {
        "more available"
    } else {
        "end of results"
    };
    let _ = writeln!(out, "-- {} images, {}", view.images.len(), tail);
    if let Some(err) = &view.feed_error {
        let _ = writeln!(out, "error: {err}");
    }
    out
}

fn push_image(out: &mut String, image: &ImageRecord) {
    let scraped = image
        .scraped_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "{:<26} {:<12} {:>4}x{:<4} {}  {}",
        image.id, image.category, image.width, image.height, scraped, image.title
    );
    let _ = writeln!(out, "    {}", image.full_size());
}

pub fn render_stats(view: &CatalogViewModel, categories: &CategoryTable) -> String {
    let mut out = String::new();
    match &view.stats {
        Some(stats) => push_stats(&mut out, stats, categories),
        None => out.push_str("no statistics available\n"),
    }
    if let Some(err) = &view.stats_error {
        let _ = writeln!(out, "error: {err}");
    }
    out
}

fn push_stats(out: &mut String, stats: &CatalogStats, categories: &CategoryTable) {
    let _ = writeln!(out, "Total images: {}", stats.total_images);
    push_counts(out, "Top tags", &stats.top_tags);
    push_counts(out, "Sources", &stats.source_breakdown);
    let _ = writeln!(out, "Categories:");
    for entry in &stats.category_breakdown {
        let _ = writeln!(out, "  {:<20} {}", entry.label, entry.count);
        let subs = categories.subcategories(&entry.label);
        if !subs.is_empty() {
            let _ = writeln!(out, "    {}", subs.join(", "));
        }
    }
}

fn push_counts(out: &mut String, title: &str, entries: &[CountEntry]) {
    let _ = writeln!(out, "{title}:");
    for entry in entries {
        let _ = writeln!(out, "  {:<20} {}", entry.label, entry.count);
    }
}

pub fn render_scrape(view: &CatalogViewModel) -> String {
    let scrape = &view.scrape;
    let mut out = String::new();
    let phase = match scrape.phase {
        PollerPhase::Idle => "idle",
        PollerPhase::Submitting => "submitting",
        PollerPhase::Polling => "polling",
        PollerPhase::Completed => "completed",
        PollerPhase::Failed => "failed",
        PollerPhase::NotFound => "task not found",
    };
    match &scrape.task_id {
        Some(task_id) => {
            let _ = writeln!(out, "Task {task_id}: {phase}");
        }
        None => {
            let _ = writeln!(out, "Scrape: {phase}");
        }
    }
    if let Some(message) = &scrape.message {
        let _ = writeln!(out, "  {message}");
    }
    if let Some(err) = &scrape.error {
        let _ = writeln!(out, "error: {err}");
    }
    if !scrape.images.is_empty() {
        let _ = writeln!(out, "Downloaded images ({}):", scrape.images.len());
        for image in &scrape.images {
            push_image(&mut out, image);
        }
    }
    out
}
