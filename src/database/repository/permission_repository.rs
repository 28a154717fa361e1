//! Role permission repository.
//!
//! One document per (role, module) pair.

use futures::TryStreamExt;
use mongodb::{Collection, IndexModel};
use mongodb::bson::doc;
use mongodb::options::{FindOneAndReplaceOptions, IndexOptions, ReturnDocument};
use tracing::debug;

use crate::database::Database;
use crate::database::models::{PermissionEntry, Role};
use crate::database::store::{PermissionStore, UpsertOutcome, permission_outcome};
use crate::error::StoreError;

/// Repository for role permissions.
#[derive(Clone)]
pub struct PermissionRepository {
    collection: Collection<PermissionEntry>,
}

impl PermissionRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }

    /// Create the unique index on `(role, module)` if it does not exist.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.collection.create_index(Self::pair_index()).await?;
        debug!("Ensured unique (role, module) index on permissions");
        Ok(())
    }

    fn pair_index() -> IndexModel {
        IndexModel::builder()
            .keys(doc! { "role": 1, "module": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build()
    }
}

impl PermissionStore for PermissionRepository {
    async fn load_all_permissions(&self) -> Result<Vec<PermissionEntry>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let entries: Vec<PermissionEntry> = cursor.try_collect().await?;
        debug!("DB loaded {} permission entries", entries.len());
        Ok(entries)
    }

    async fn load_role_permissions(&self, role: Role) -> Result<Vec<PermissionEntry>, StoreError> {
        let cursor = self.collection.find(doc! { "role": role.as_str() }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn upsert_permission(&self, entry: PermissionEntry) -> Result<UpsertOutcome, StoreError> {
        let filter = doc! { "role": entry.role.as_str(), "module": entry.module.as_str() };
        let options = FindOneAndReplaceOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();

        let previous = self
            .collection
            .find_one_and_replace(filter, &entry)
            .with_options(options)
            .await?;

        let outcome = permission_outcome(previous.as_ref(), &entry);
        debug!("Upserted permission {}/{}: {:?}", entry.role, entry.module, outcome);
        Ok(outcome)
    }
}
