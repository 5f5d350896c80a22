// Batch scan: score many items (an exported inbox, a comment dump) with
// bounded concurrency, then record them in input order.
//
// Each item is an independent scoring operation under the same config
// snapshot. Blank items are skipped; indices still refer to input position.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use super::record::Recorder;
use crate::db::models::ContentType;
use crate::output::truncate_chars;
use crate::scoring::promotional::{is_promotional, SPAM_FLAG_THRESHOLD};
use crate::scoring::{AggregateScore, Analyzer};
use crate::steering::SteeringConfig;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub content_type: ContentType,
    /// Items scored at once (at least 1)
    pub concurrency: usize,
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            content_type: ContentType::Text,
            concurrency: 4,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    /// Position in the input
    pub index: usize,
    pub preview: String,
    pub score: AggregateScore,
    pub is_spam: bool,
    pub is_promotional: bool,
    pub analysis_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub threats: usize,
    pub skipped: usize,
}

/// Batch input is either a JSON array of strings or one item per line.
pub fn parse_items(raw: &str) -> Result<Vec<String>> {
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(raw)
            .context("Batch input looks like JSON but isn't a string array");
    }
    Ok(raw.lines().map(str::to_string).collect())
}

/// Score every non-blank item. Recording is optional and never changes a
/// verdict; storage failures are logged.
pub async fn scan(
    analyzer: &Analyzer,
    config: &SteeringConfig,
    items: &[String],
    options: &BatchOptions,
    recorder: Option<&Recorder>,
) -> BatchReport {
    let work: Vec<(usize, &str)> = items
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| (i, text.as_str()))
        .collect();
    let skipped = items.len() - work.len();

    info!(
        items = work.len(),
        skipped,
        concurrency = options.concurrency,
        "Starting batch scan"
    );

    let pb = if options.show_progress {
        let pb = ProgressBar::new(work.len() as u64);
        let template = "  Scanning [{bar:30}] {pos}/{len} ({eta})";
        if let Ok(style) = ProgressStyle::with_template(template) {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    // buffered (not buffer_unordered) keeps results in input order
    let mut scored = stream::iter(work)
        .map(|(index, text)| async move {
            let analysis = analyzer.analyze(text, config).await;
            (index, text, analysis.score)
        })
        .buffered(options.concurrency.max(1));

    let mut report = BatchReport {
        skipped,
        ..Default::default()
    };

    while let Some((index, text, score)) = scored.next().await {
        pb.inc(1);
        let promotional = is_promotional(text);

        let analysis_id = match recorder {
            Some(recorder) => match recorder
                .save(options.content_type, text, &score, promotional)
                .await
            {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(index, error = %e, "Failed to record batch item");
                    None
                }
            },
            None => None,
        };

        if score.is_threat {
            report.threats += 1;
        }
        report.items.push(BatchItem {
            index,
            preview: truncate_chars(&text.replace('\n', " "), 60),
            is_spam: score.spam > SPAM_FLAG_THRESHOLD,
            is_promotional: promotional,
            score,
            analysis_id,
        });
    }
    pb.finish_and_clear();

    if let Some(recorder) = recorder {
        if let Err(e) = recorder
            .notify_batch(options.content_type, report.threats)
            .await
        {
            warn!(error = %e, "Failed to raise batch notification");
        }
    }

    info!(
        scanned = report.items.len(),
        threats = report.threats,
        "Batch scan complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::sqlite::SqliteDatabase;
    use crate::db::Database;
    use crate::detectors::DetectorSet;

    fn items(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn parses_json_array_or_lines() {
        let items = parse_items(r#"["one", "two\nlines"]"#).unwrap();
        assert_eq!(items, vec!["one".to_string(), "two\nlines".to_string()]);

        let items = parse_items("first\n\nsecond\n").unwrap();
        assert_eq!(items, vec!["first", "", "second"]);

        assert!(parse_items("[1, 2]").is_err());
    }

    #[tokio::test]
    async fn preserves_order_and_skips_blank_items() {
        let analyzer = Analyzer::new(DetectorSet::local());
        let input = items(&[
            "FREE MONEY WINNER CLICK HERE ACT NOW",
            "   ",
            "see you at the standup",
            "you stupid idiot!!!",
        ]);
        let options = BatchOptions {
            concurrency: 3,
            ..Default::default()
        };

        let report = scan(&analyzer, &SteeringConfig::default(), &input, &options, None).await;

        let indices: Vec<usize> = report.items.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.threats, 2);
        assert!(report.items[0].is_spam);
        assert!(!report.items[1].score.is_threat);
        assert!(report.items.iter().all(|i| i.analysis_id.is_none()));
    }

    #[tokio::test]
    async fn records_items_and_one_summary_notification() {
        let analyzer = Analyzer::new(DetectorSet::local());
        let db = Arc::new(SqliteDatabase::in_memory().unwrap());
        let recorder = Recorder::new(db.clone(), "inbox-owner");
        let input = items(&[
            "Weekly newsletter: 20% off, unsubscribe anytime",
            "URGENT wire money via western union within 24 hours",
            "Lunch on Friday?",
        ]);
        let options = BatchOptions {
            content_type: ContentType::Email,
            ..Default::default()
        };

        let report = scan(
            &analyzer,
            &SteeringConfig::default(),
            &input,
            &options,
            Some(&recorder),
        )
        .await;

        assert_eq!(report.items.len(), 3);
        assert!(report.items.iter().all(|i| i.analysis_id.is_some()));
        assert!(report.items[0].is_promotional);
        assert!(!report.items[2].is_promotional);

        let saved = db.get_recent_analyses("inbox-owner", 10, false).await.unwrap();
        assert_eq!(saved.len(), 3);
        assert!(saved.iter().all(|r| r.content_type == ContentType::Email));

        let notifications = db.get_notifications("inbox-owner", true, 10).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Email Threats Detected!");
    }
}
