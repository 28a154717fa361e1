//! Settings repository.
//!
//! System settings live in their own collection, one document per key.

use futures::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{ClientSession, Collection, IndexModel};
use tracing::debug;

use crate::database::Database;
use crate::database::models::SettingEntry;
use crate::database::store::{SettingsStore, UpsertOutcome};
use crate::error::StoreError;

/// Repository for system settings.
#[derive(Clone)]
pub struct SettingsRepository {
    db: Database,
    collection: Collection<SettingEntry>,
}

impl SettingsRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection(collection),
        }
    }

    /// Create the unique index on `key` if it does not exist.
    ///
    /// Without it two concurrent upserts of a new key can both insert.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.collection.create_index(Self::key_index()).await?;
        debug!("Ensured unique key index on settings");
        Ok(())
    }

    fn key_index() -> IndexModel {
        IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build()
    }

    /// `$set` the mutable fields, `$setOnInsert` the ones fixed at creation.
    /// The key itself is seeded from the equality filter on insert.
    fn upsert_update(entry: &SettingEntry) -> Document {
        doc! {
            "$set": {
                "value": entry.value.as_str(),
                "last_modified": entry.last_modified.to_rfc3339(),
                "modified_by": entry.modified_by.clone(),
            },
            "$setOnInsert": {
                "value_type": entry.value_type.as_str(),
                "category": entry.category.as_str(),
            },
        }
    }

    fn upsert_options() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build()
    }

    fn classify(previous: Option<SettingEntry>, entry: &SettingEntry) -> UpsertOutcome {
        match previous {
            None => UpsertOutcome::Created,
            Some(p) if p.value == entry.value => UpsertOutcome::Unchanged,
            Some(_) => UpsertOutcome::Updated,
        }
    }

    async fn upsert_in_session(
        &self,
        entry: &SettingEntry,
        session: &mut ClientSession,
    ) -> Result<UpsertOutcome, StoreError> {
        let previous = self
            .collection
            .find_one_and_update(doc! { "key": entry.key.as_str() }, Self::upsert_update(entry))
            .with_options(Self::upsert_options())
            .session(session)
            .await?;
        Ok(Self::classify(previous, entry))
    }
}

impl SettingsStore for SettingsRepository {
    async fn load_all_settings(&self) -> Result<Vec<SettingEntry>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let settings: Vec<SettingEntry> = cursor.try_collect().await?;
        debug!("DB loaded {} settings", settings.len());
        Ok(settings)
    }

    async fn upsert_setting(&self, entry: SettingEntry) -> Result<UpsertOutcome, StoreError> {
        let previous = self
            .collection
            .find_one_and_update(doc! { "key": entry.key.as_str() }, Self::upsert_update(&entry))
            .with_options(Self::upsert_options())
            .await?;

        let outcome = Self::classify(previous, &entry);
        debug!("Upserted setting {}: {:?}", entry.key, outcome);
        Ok(outcome)
    }

    async fn upsert_settings(&self, entries: Vec<SettingEntry>) -> Result<Vec<UpsertOutcome>, StoreError> {
        let mut session = self.db.start_session().await?;
        session.start_transaction().await?;

        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in &entries {
            // Dropping the session on error aborts the transaction.
            outcomes.push(self.upsert_in_session(entry, &mut session).await?);
        }

        session.commit_transaction().await?;
        debug!("Committed {} settings in one transaction", outcomes.len());
        Ok(outcomes)
    }
}
