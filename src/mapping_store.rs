use crate::errors::AppError;
use crate::models::{CampaignInfo, MappingTable};
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Whole-table persistence for the campaign mapping.
///
/// Load runs once at startup; save rewrites the entire document. Both are
/// synchronous: the table is a small file and no timeout or cancellation
/// semantics apply to it.
pub trait MappingStorage: Send + Sync {
    /// Reads the whole mapping table from the backing medium.
    fn load(&self) -> Result<MappingTable, AppError>;

    /// Rewrites the whole mapping table to the backing medium.
    fn save(&self, table: &MappingTable) -> Result<(), AppError>;
}

/// Flat-file JSON backend, the production storage.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MappingStorage for FileStorage {
    fn load(&self) -> Result<MappingTable, AppError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::ConfigurationError(format!(
                "Cannot read campaign mapping file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigurationError(format!(
                "Campaign mapping file {} is not valid JSON: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, table: &MappingTable) -> Result<(), AppError> {
        let body = serde_json::to_string_pretty(table).map_err(|e| {
            AppError::PersistenceError(format!("Cannot serialize campaign mapping: {}", e))
        })?;
        std::fs::write(&self.path, body).map_err(|e| {
            AppError::PersistenceError(format!(
                "Cannot write campaign mapping file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// In-memory view of the campaign mapping plus its backing storage.
///
/// The table is process-wide shared state owned exclusively by this type;
/// handlers reach it through the enrichment engine. The backing medium sits
/// behind `MappingStorage` so tests (or a future key-value backend) can swap
/// it without touching enrichment logic.
pub struct MappingStore {
    storage: Box<dyn MappingStorage>,
    table: RwLock<MappingTable>,
}

impl std::fmt::Debug for MappingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingStore")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl MappingStore {
    /// Loads the table from storage. Failure here is fatal: the service
    /// must not start enrichment without a mapping table.
    pub fn open(storage: Box<dyn MappingStorage>) -> Result<Self, AppError> {
        let table = storage.load()?;
        tracing::info!(
            campaigns = table.google_ads_campaigns.len(),
            "Campaign mapping table loaded"
        );
        Ok(Self {
            storage,
            table: RwLock::new(table),
        })
    }

    /// Opens a store backed by the JSON file at `path`.
    pub fn with_file(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        Self::open(Box::new(FileStorage::new(path)))
    }

    /// Case-sensitive exact lookup. Absence is a normal outcome.
    pub async fn get(&self, campaign_id: &str) -> Option<CampaignInfo> {
        self.table
            .read()
            .await
            .google_ads_campaigns
            .get(campaign_id)
            .cloned()
    }

    /// Inserts or replaces one campaign entry and rewrites the whole table
    /// to storage.
    ///
    /// The write lock is held across the full read-modify-write-persist
    /// sequence: at most one upsert commits to storage at a time, so
    /// concurrent calls cannot drop each other's entries. On a failed save
    /// the in-memory change is rolled back; memory never diverges from
    /// storage.
    pub async fn upsert(&self, campaign_id: &str, info: CampaignInfo) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        let previous = table
            .google_ads_campaigns
            .insert(campaign_id.to_string(), info);

        if let Err(err) = self.storage.save(&table) {
            match previous {
                Some(prev) => {
                    table
                        .google_ads_campaigns
                        .insert(campaign_id.to_string(), prev);
                }
                None => {
                    table.google_ads_campaigns.remove(campaign_id);
                }
            }
            return Err(err);
        }

        tracing::info!(campaign_id = %campaign_id, "Campaign mapping persisted");
        Ok(())
    }

    /// Number of mapped campaigns, for the health endpoint.
    pub async fn campaign_count(&self) -> usize {
        self.table.read().await.google_ads_campaigns.len()
    }
}
