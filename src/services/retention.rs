use crate::{
    config::retention::RetentionConfig,
    error::AppResult,
    models::{complaint, Complaint, ComplaintStatus},
    services::{complaint::ComplaintService, upload::UploadConfig},
};
use chrono::NaiveDateTime;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Recurring purge of resolved complaints past the retention window.
///
/// Runs on its own timer task, independent of the request path. Each
/// record is purged in isolation: one failure is logged and does not stop
/// the sweep, and the record stays in place for the next run.
pub struct RetentionSweeper {
    db: DatabaseConnection,
    config: RetentionConfig,
    upload: UploadConfig,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub purged: u64,
    pub failed: u64,
}

/// Resolved complaints last touched strictly before this instant are
/// eligible for purging.
pub fn retention_cutoff(now: NaiveDateTime, window_days: i64) -> NaiveDateTime {
    now - chrono::Duration::days(window_days)
}

impl RetentionSweeper {
    pub fn new(db: DatabaseConnection, config: RetentionConfig, upload: UploadConfig) -> Self {
        Self { db, config, upload }
    }

    /// Spawn the sweep loop. The first tick fires immediately, then every
    /// `sweep_interval`. A slow sweep delays its own next tick only.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.sweep_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match self.sweep_once().await {
                    Ok(summary) => {
                        tracing::info!(
                            purged = summary.purged,
                            failed = summary.failed,
                            "Retention sweep finished"
                        );
                    }
                    Err(e) => {
                        tracing::error!("Retention sweep failed: {e}");
                    }
                }
            }
        })
    }

    /// One pass: collect expired resolved complaints and purge each.
    pub async fn sweep_once(&self) -> AppResult<SweepSummary> {
        let cutoff = retention_cutoff(chrono::Utc::now().naive_utc(), self.config.window_days);

        let expired = Complaint::find()
            .filter(complaint::Column::Status.eq(ComplaintStatus::Resolved.as_str()))
            .filter(complaint::Column::UpdatedAt.lt(cutoff))
            .all(&self.db)
            .await?;

        let service = ComplaintService::new(self.db.clone());
        let mut summary = SweepSummary::default();

        for complaint in expired {
            let complaint_id = complaint.id;
            match service.purge(complaint, &self.upload).await {
                Ok(()) => summary.purged += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(complaint_id, "Failed to purge expired complaint: {e}");
                }
            }
        }

        Ok(summary)
    }
}
