use crate::db::{AddOutcome, Database, IngestSummary, Result};
use tracing::{debug, warn};

/// Who posted what in each guild's introduction channel.
///
/// The ledger only keeps state. Deciding when a count is worth reporting is
/// left to [`crate::policy::IntroPolicy`].
#[derive(Clone)]
pub struct IntroLedger {
    db: Database,
}

impl IntroLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record a post. Re-adding a known message id changes nothing.
    pub async fn add(&self, guild_id: u64, user_id: u64, message_id: u64) -> Result<AddOutcome> {
        let outcome = self
            .db
            .run_blocking(move |db| db.add_introduction(guild_id, user_id, message_id))
            .await?;

        match outcome {
            AddOutcome::Inserted => {
                debug!("Recorded intro {} by {} in guild {}", message_id, user_id, guild_id)
            }
            AddOutcome::Duplicate { existing_user } => warn!(
                "Ignoring duplicate intro {} in guild {} (recorded for user {}, delivered for {})",
                message_id, guild_id, existing_user, user_id
            ),
        }
        Ok(outcome)
    }

    /// Remove one post. Unknown posts are ignored; returns whether anything
    /// was removed.
    pub async fn remove(&self, guild_id: u64, user_id: u64, message_id: u64) -> Result<bool> {
        self.db
            .run_blocking(move |db| db.remove_introduction(guild_id, user_id, message_id))
            .await
    }

    pub async fn count(&self, guild_id: u64, user_id: u64) -> Result<usize> {
        self.db
            .run_blocking(move |db| db.count_introductions(guild_id, user_id))
            .await
    }

    pub async fn list_message_ids(&self, guild_id: u64, user_id: u64) -> Result<Vec<u64>> {
        self.db
            .run_blocking(move |db| db.list_introduction_ids(guild_id, user_id))
            .await
    }

    /// Author of a recorded post, or `None` for messages the ledger never saw.
    pub async fn user_for_message(&self, guild_id: u64, message_id: u64) -> Result<Option<u64>> {
        self.db
            .run_blocking(move |db| db.user_for_message(guild_id, message_id))
            .await
    }

    /// Start staging records for a bulk load. Nothing is visible until the
    /// batch is committed.
    pub fn begin_batch(&self, guild_id: u64) -> BatchIngestor {
        BatchIngestor {
            ledger: self.clone(),
            guild_id,
            staged: Vec::new(),
        }
    }

    /// Write a staged batch in a single transaction.
    pub async fn flush(&self, batch: BatchIngestor) -> Result<IngestSummary> {
        let BatchIngestor { guild_id, staged, .. } = batch;
        if staged.is_empty() {
            return Ok(IngestSummary::default());
        }

        let summary = self
            .db
            .run_blocking(move |db| db.add_introductions(guild_id, &staged))
            .await?;

        if summary.duplicates > 0 {
            warn!(
                "Backfill for guild {} skipped {} already recorded intros",
                guild_id, summary.duplicates
            );
        }
        Ok(summary)
    }
}

/// Staged `(user_id, message_id)` records for one guild, kept in arrival
/// order. Dropping the batch discards it.
pub struct BatchIngestor {
    ledger: IntroLedger,
    guild_id: u64,
    staged: Vec<(u64, u64)>,
}

impl BatchIngestor {
    pub fn stage(&mut self, user_id: u64, message_id: u64) {
        self.staged.push((user_id, message_id));
    }

    pub fn ingest<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        self.staged.extend(records);
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Flush once. Consuming `self` rules out a second commit.
    pub async fn commit(self) -> Result<IngestSummary> {
        let ledger = self.ledger.clone();
        ledger.flush(self).await
    }
}
