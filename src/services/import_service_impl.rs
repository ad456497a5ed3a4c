//! `SeaORM` implementation of the `ImportService` trait.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sea_orm::TransactionTrait;
use std::path::Path;
use tracing::{info, warn};

use crate::analysis::sentiment::LexiconClassifier;
use crate::config::ImportConfig;
use crate::db::{Store, UpsertOutcome};
use crate::parser::catalog_csv::{CsvRow, parse_catalog};
use crate::parser::parse_ram_gb;
use crate::services::import_service::{
    BackfillSummary, ImportError, ImportService, ImportSummary,
};

const BASE_RATING: f64 = 3.0;
const CUE_WEIGHT: f64 = 0.5;
const JITTER: f64 = 0.2;

/// Synthesize a 1-5 star rating from review text: half a star per
/// positive/negative cue around 3, plus a little jitter. Rows without a
/// review get a rating between 3 and 4.
pub fn rating_for_comment<R: Rng + ?Sized>(
    comment: Option<&str>,
    classifier: &LexiconClassifier,
    rng: &mut R,
) -> f64 {
    let round1 = |v: f64| (v * 10.0).round() / 10.0;

    let Some(text) = comment.map(str::trim).filter(|t| !t.is_empty()) else {
        return round1(rng.random_range(3.0..=4.0));
    };

    let (positive, negative) = classifier.cue_counts(text);
    #[allow(clippy::cast_precision_loss)]
    let base = CUE_WEIGHT.mul_add(positive as f64 - negative as f64, BASE_RATING);
    let jittered = base.clamp(1.0, 5.0) + rng.random_range(-JITTER..=JITTER);
    round1(jittered).clamp(1.0, 5.0)
}

fn record_rows(outcome: &'static str, n: usize) {
    metrics::counter!("import_rows_total", "outcome" => outcome).increment(n as u64);
}

pub struct SeaOrmImportService {
    store: Store,
    config: ImportConfig,
    classifier: LexiconClassifier,
}

impl SeaOrmImportService {
    #[must_use]
    pub const fn new(store: Store, config: ImportConfig) -> Self {
        Self {
            store,
            config,
            classifier: LexiconClassifier::new(),
        }
    }

    async fn write_batch(
        &self,
        batch: Vec<CsvRow>,
        rng: &mut StdRng,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        let txn = self.store.conn.begin().await?;

        for row in batch {
            let line = row.line;
            let comment = row.comment.clone();
            let rating = rating_for_comment(comment.as_deref(), &self.classifier, rng);
            let record = row.into_record(Some(rating));

            let outcome = match Store::upsert_laptop(&txn, &record).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(line, original_id = %record.original_id, error = %e, "Failed to write CSV row");
                    summary.failed += 1;
                    continue;
                }
            };
            match outcome {
                UpsertOutcome::Added(_) => summary.added += 1,
                UpsertOutcome::Updated(_) => summary.updated += 1,
            }

            if let Some(comment) = comment {
                match Store::upsert_comment(&txn, outcome.id(), &comment).await {
                    Ok(true) => summary.comments_added += 1,
                    Ok(false) => summary.comments_updated += 1,
                    Err(e) => warn!(line, error = %e, "Failed to write review for CSV row"),
                }
            }
        }

        txn.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ImportService for SeaOrmImportService {
    async fn import_csv(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ImportError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let parsed = parse_catalog(&bytes)?;
        info!(
            path = %path.display(),
            encoding = parsed.encoding,
            rows = parsed.rows.len(),
            "Decoded catalog CSV"
        );

        let mut summary = ImportSummary {
            encoding: parsed.encoding,
            rows: parsed.rows.len(),
            ..ImportSummary::default()
        };

        let mut valid = Vec::with_capacity(parsed.rows.len());
        for row in parsed.rows {
            match row {
                Ok(row) => valid.push(row),
                Err(e) => {
                    warn!(line = e.line, reason = %e.reason, "Skipping CSV row");
                    summary.failed += 1;
                }
            }
        }

        let mut rng = StdRng::from_os_rng();
        let batch_size = self.config.batch_size.max(1);
        let mut processed = 0;
        let mut rows = valid.into_iter().peekable();

        while rows.peek().is_some() {
            let batch: Vec<CsvRow> = rows.by_ref().take(batch_size).collect();
            processed += batch.len();
            self.write_batch(batch, &mut rng, &mut summary).await?;
            info!(processed, added = summary.added, updated = summary.updated, "Committed import batch");
        }

        record_rows("added", summary.added);
        record_rows("updated", summary.updated);
        record_rows("failed", summary.failed);

        info!(
            rows = summary.rows,
            added = summary.added,
            updated = summary.updated,
            failed = summary.failed,
            "Catalog import finished"
        );
        Ok(summary)
    }

    async fn backfill_ram_gb(&self) -> Result<BackfillSummary, ImportError> {
        let limit = self.config.batch_size.max(1) as u64;
        let mut summary = BackfillSummary::default();
        let mut after_id = 0;

        loop {
            let batch = self.store.laptops_missing_ram_gb(after_id, limit).await?;
            let Some(&(last_id, _)) = batch.last() else {
                break;
            };

            let txn = self.store.conn.begin().await?;
            for (id, ram) in &batch {
                summary.scanned += 1;
                match ram.as_deref().and_then(parse_ram_gb) {
                    Some(gb) => {
                        Store::set_ram_gb(&txn, *id, Some(gb)).await?;
                        summary.updated += 1;
                    }
                    None => summary.unparsed += 1,
                }
            }
            txn.commit().await?;

            after_id = last_id;
        }

        info!(
            scanned = summary.scanned,
            updated = summary.updated,
            unparsed = summary.unparsed,
            "Memory size backfill finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_without_review_stays_between_three_and_four() {
        let classifier = LexiconClassifier::new();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let rating = rating_for_comment(None, &classifier, &mut rng);
            assert!((3.0..=4.0).contains(&rating));
            let rating = rating_for_comment(Some("   "), &classifier, &mut rng);
            assert!((3.0..=4.0).contains(&rating));
        }
    }

    #[test]
    fn test_rating_follows_review_tone() {
        let classifier = LexiconClassifier::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let good = rating_for_comment(Some("非常满意，推荐购买"), &classifier, &mut rng);
            let bad = rating_for_comment(Some("很失望，卡顿，退货"), &classifier, &mut rng);
            assert!(good > 3.2, "good rating {good}");
            assert!(bad < 2.8, "bad rating {bad}");
            assert!((1.0..=5.0).contains(&good));
            assert!((1.0..=5.0).contains(&bad));
        }
    }
}
