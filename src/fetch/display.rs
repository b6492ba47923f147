use std::error::Error;
use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::config::{ModelVariant, Settings};
use super::error::FetchError;
use super::types::{AttemptOutcome, FetchSummary, TokenizerAttempt, TokenizerOutcome};

/// Prints the banner shown before anything is fetched.
pub fn print_header(settings: &Settings) {
    let primary = settings
        .artifacts
        .variants
        .first()
        .map(|v| v.name.as_str())
        .unwrap_or("default");
    println!("{}", "Downloading model files...".bold());
    println!("Repository: {}", settings.hub.repo_id.cyan());
    println!("Revision: {}", settings.hub.revision);
    println!("Preferred variant: {}", primary);
    println!();
}

/// Warns that a later, less preferred variant is being used.
pub fn print_variant_fallback(preferred: Option<&ModelVariant>, chosen: &ModelVariant) {
    if let Some(preferred) = preferred {
        println!(
            "{}",
            format!("⚠  {} models not found. Checking alternatives...", preferred.name).yellow()
        );
    }
    let note = chosen.note.as_deref().unwrap_or("different size/accuracy tradeoff");
    println!(
        "{}",
        format!("Found {} models. Using as fallback ({}).", chosen.name, note).yellow()
    );
}

/// Prints every failed tokenizer attempt as a single warning block.
pub fn print_tokenizer_warning(attempts: &[TokenizerAttempt]) {
    println!(
        "{}",
        "⚠  Could not download a tokenizer; continuing without one.".yellow()
    );
    for attempt in attempts {
        if let AttemptOutcome::Failed(reason) = &attempt.outcome {
            println!("  - {}: {}", attempt.remote, reason.bright_black());
        }
    }
}

/// Prints the final table of artifacts and the total size.
pub fn print_summary(summary: &FetchSummary, settings: &Settings) {
    println!();
    println!("{}", "✅ Model files downloaded successfully!".green().bold());
    println!(
        "Variant: {}  (encoder {}, decoder {})",
        summary.selection.variant.name.cyan(),
        summary.selection.encoder,
        summary.selection.decoder
    );
    match &summary.tokenizer {
        TokenizerOutcome::Fetched { remote, .. } => println!("Tokenizer: {}", remote),
        TokenizerOutcome::Unavailable { .. } => {
            println!("Tokenizer: {}", "unavailable (see warning above)".yellow())
        }
    }

    let report = &summary.report;
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("File").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Size").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for entry in &report.entries {
        table.add_row(vec![
            Cell::new(&entry.name).fg(comfy_table::Color::Green),
            Cell::new(entry.display_size()).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("\n{}", table);
    println!("{}", format!("Total model size: {:.2} MB", report.total_mb()).bright_green());

    if let Some(budget) = settings.report.size_budget_mb {
        if report.exceeds(budget) {
            println!(
                "{}",
                format!("⚠  Total size exceeds the {:.0} MB budget", budget).yellow()
            );
        } else {
            println!("{}", format!("(Target: < {:.0} MB)", budget).bright_black());
        }
    }
}

/// Prints a fatal error, its causes and, where useful, manual download instructions.
pub fn print_failure(err: &FetchError, settings: &Settings) {
    println!();
    println!("{}", format!("❌ Error downloading model: {}", err).red().bold());

    // The top-level message already includes the direct source
    let mut cause = err.source().and_then(|s| s.source());
    while let Some(e) = cause {
        println!("   caused by: {}", e);
        cause = e.source();
    }

    if let FetchError::NoSuitableModel { preview, total, .. } = err {
        print_listing_preview(preview, *total);
    }

    if err.needs_remediation() {
        print_remediation(settings);
    }
}

/// Prints the leading listing entries to help diagnose a missing variant.
pub fn print_listing_preview(preview: &[String], total: usize) {
    println!("Available files (first {} of {}):", preview.len(), total);
    for file in preview {
        println!("  - {}", file);
    }
}

/// Prints where and what to download by hand.
pub fn print_remediation(settings: &Settings) {
    println!();
    println!("Alternative: Download manually from:");
    println!("  {}", settings.manual_download_url().underline());
    println!();
    println!("Required files:");
    for file in settings.required_files() {
        println!("  - {}", file);
    }
    println!(
        "Place them in {} as {}, {} and {}.",
        settings.models.directory.display(),
        settings.artifacts.names.encoder,
        settings.artifacts.names.decoder,
        settings.artifacts.names.tokenizer
    );
}
