// Colored terminal output for verdicts, history, and settings.
//
// main.rs delegates all formatting here so command handlers stay short.

use colored::Colorize;

use crate::db::models::{AnalysisRecord, HistoryStats, Notification};
use crate::detectors::traits::{DetectorKind, ThreatLevel};
use crate::pipeline::batch::BatchReport;
use crate::scoring::haunt::haunt_level;
use crate::scoring::Analysis;
use crate::steering::SteeringConfig;

/// Display one analysis: overall verdict, then a bar per detector.
pub fn display_analysis(analysis: &Analysis) {
    let score = &analysis.score;

    println!();
    if score.is_threat {
        println!(
            "  {} {} risk detected ({:.0}% confidence, haunt level {})",
            "!!".red().bold(),
            colorize_level(score.overall, &score.overall.as_str().to_uppercase()),
            score.max_score(),
            haunt_level(score),
        );
        println!("     strongest signal: {}", score.dominant().as_str().bold());
    } else {
        println!("  {} Content looks safe", "ok".green().bold());
    }
    println!();

    for kind in DetectorKind::ALL {
        let result = analysis.result_for(kind);
        let value = score.score_for(kind);
        println!(
            "  {:<10} {:>5.1}  {}  {}",
            kind.as_str(),
            value,
            score_bar(value, 20),
            result.details.as_deref().unwrap_or("disabled").dimmed(),
        );
    }
    println!();
}

/// Display a batch scan, one line per item in input order.
pub fn display_batch(report: &BatchReport) {
    println!(
        "\n{}",
        format!("=== Batch Scan ({} items) ===", report.items.len()).bold()
    );
    println!();

    for item in &report.items {
        let level = item.score.overall;
        let mut tags = Vec::new();
        if item.is_spam {
            tags.push("spam".yellow().to_string());
        }
        if item.is_promotional && !item.score.is_threat {
            tags.push("promo".cyan().to_string());
        }
        println!(
            "  {:>4}. {:<8} {:>5.1}  {}  {}",
            item.index + 1,
            colorize_level(level, level.as_str()),
            item.score.max_score(),
            item.preview.dimmed(),
            tags.join(" "),
        );
    }

    println!();
    if report.threats > 0 {
        println!(
            "  {} {} of {} items look threatening",
            "!!".red().bold(),
            report.threats,
            report.items.len()
        );
    } else {
        println!("  {} No threats found", "ok".green().bold());
    }
    if report.skipped > 0 {
        println!("  {}", format!("{} blank items skipped", report.skipped).dimmed());
    }
}

/// Display saved history rows, newest first.
pub fn display_history(records: &[AnalysisRecord]) {
    if records.is_empty() {
        println!("No analyses recorded yet. Run `trust-guardian analyze` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Analysis History ({} items) ===", records.len()).bold()
    );
    println!();
    println!(
        "  {:<19}  {:<9} {:<8} {:>4} {:>4} {:>4} {:>4}  {}",
        "When".dimmed(),
        "Type".dimmed(),
        "Level".dimmed(),
        "Spam".dimmed(),
        "Fake".dimmed(),
        "Tox".dimmed(),
        "Scam".dimmed(),
        "Preview".dimmed(),
    );
    println!("  {}", "-".repeat(90).dimmed());

    for r in records {
        println!(
            "  {:<19}  {:<9} {:<8} {:>4} {:>4} {:>4} {:>4}  {}",
            r.analyzed_at,
            r.content_type.as_str(),
            colorize_level(r.overall_threat_level, r.overall_threat_level.as_str()),
            r.spam_score,
            r.deepfake_score,
            r.toxicity_score,
            r.scam_score,
            r.short_preview(40),
        );
    }
    println!();
}

pub fn display_notifications(notifications: &[Notification]) {
    if notifications.is_empty() {
        println!("No notifications.");
        return;
    }

    for n in notifications {
        let marker = if n.is_read {
            " ".normal()
        } else {
            "*".red().bold()
        };
        println!("  {} {}  {}", marker, n.created_at.dimmed(), n.title.bold());
        println!("      {}", n.message);
    }
}

pub fn display_stats(stats: &HistoryStats) {
    println!(
        "Scans: {} total, {} threats ({} high, {} medium, {} low)",
        stats.total_scans, stats.threats_detected, stats.high, stats.medium, stats.low
    );
    match &stats.last_scan_at {
        Some(at) => println!("Last scan: {at}"),
        None => println!("Last scan: never"),
    }
}

pub fn display_steering(config: &SteeringConfig) {
    println!("{}", "Steering config".bold());
    println!(
        "  Detection strictness: {}/10 (x{:.2})",
        config.detection_strictness,
        config.strictness_multiplier()
    );
    println!("  Visual haunting:      {}/10", config.visual_haunting);
    println!("  UI theme:             {}", config.ui_theme.as_str());
    println!("  Active agents:");
    for kind in DetectorKind::ALL {
        let state = if config.is_agent_active(kind) {
            "on".green()
        } else {
            "off".red()
        };
        println!("    {:<18} {}", kind.agent_key(), state);
    }
}

/// A fixed-width bar for a 0-100 score.
fn score_bar(value: f64, width: usize) -> String {
    let filled = ((value.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

/// Color text by threat level.
fn colorize_level(level: ThreatLevel, text: &str) -> colored::ColoredString {
    match level {
        ThreatLevel::High => text.red().bold(),
        ThreatLevel::Medium => text.yellow(),
        ThreatLevel::Low => text.green(),
    }
}
