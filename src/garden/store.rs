use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::info;

use super::types::{ListOrder, PlantRecord, SavedPlant};
use crate::scanner::{HealthAnalysis, HealthStatus};
use crate::services::PlantStore;

/// SQLite store for the user's saved plants.
/// All operations are synchronous (rusqlite is blocking).
/// Callers in async contexts should use `tokio::task::spawn_blocking`
/// or go through [`SqlitePlantStore`].
pub struct GardenStore {
    conn: Connection,
}

/// Columns as stored, before JSON decoding.
struct PlantRow {
    id: i64,
    created_date: String,
    common_name: String,
    species_name: String,
    description: String,
    image_url: String,
    health_status: String,
    health_analysis_json: String,
    care_tips_json: String,
}

const SELECT_COLUMNS: &str = "SELECT id, created_date, common_name, species_name, description,
        image_url, health_status, health_analysis_json, care_tips_json
     FROM plants";

impl GardenStore {
    /// Create or open the garden database at `db_path`.
    pub fn new(db_path: &Path) -> Result<Self, String> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create data dir: {}", e))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| format!("Failed to open garden db: {}", e))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS plants (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_date TEXT NOT NULL,
                common_name TEXT NOT NULL,
                species_name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                image_url TEXT NOT NULL,
                health_status TEXT NOT NULL,
                health_analysis_json TEXT NOT NULL,
                care_tips_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_plants_created ON plants(created_date DESC);",
        )
        .map_err(|e| format!("Failed to create plants table: {}", e))?;

        info!("Opened garden database at {:?}", db_path);
        Ok(Self { conn })
    }

    /// Save a plant. Returns the new row id.
    pub fn create(&self, record: &PlantRecord) -> Result<i64, String> {
        let health_analysis_json = serde_json::to_string(&record.health_analysis)
            .map_err(|e| format!("Failed to serialize health analysis: {}", e))?;
        let care_tips_json = serde_json::to_string(&record.care_tips)
            .map_err(|e| format!("Failed to serialize care tips: {}", e))?;
        let created_date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        self.conn
            .execute(
                "INSERT INTO plants (created_date, common_name, species_name, description,
                    image_url, health_status, health_analysis_json, care_tips_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    created_date,
                    record.common_name,
                    record.species_name,
                    record.description,
                    record.image_url,
                    record.health_status.label(),
                    health_analysis_json,
                    care_tips_json
                ],
            )
            .map_err(|e| format!("Failed to insert plant: {}", e))?;

        let id = self.conn.last_insert_rowid();
        info!("Saved plant {} ({})", id, record.common_name);
        Ok(id)
    }

    /// List all saved plants in the given order.
    pub fn list(&self, order: ListOrder) -> Result<Vec<SavedPlant>, String> {
        let order_clause = match order {
            ListOrder::NewestFirst => "ORDER BY created_date DESC, id DESC",
            ListOrder::OldestFirst => "ORDER BY created_date ASC, id ASC",
        };
        self.query(&format!("{} {}", SELECT_COLUMNS, order_clause), &[])
    }

    /// Case-insensitive substring search over common and species names,
    /// newest first. A blank term lists everything.
    ///
    /// Matching runs in Rust: SQLite's `lower()` only folds ASCII.
    pub fn search(&self, term: &str) -> Result<Vec<SavedPlant>, String> {
        let term = term.trim().to_lowercase();
        let plants = self.list(ListOrder::NewestFirst)?;
        if term.is_empty() {
            return Ok(plants);
        }
        Ok(plants
            .into_iter()
            .filter(|p| p.record.matches_lowercase(&term))
            .collect())
    }

    pub fn get(&self, id: i64) -> Result<SavedPlant, String> {
        let mut plants = self.query(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            &[&id as &dyn rusqlite::ToSql],
        )?;
        plants.pop().ok_or_else(|| format!("Plant not found: {}", id))
    }

    /// Remove a plant. Returns whether a row was deleted.
    pub fn delete(&self, id: i64) -> Result<bool, String> {
        let affected = self
            .conn
            .execute("DELETE FROM plants WHERE id = ?1", params![id])
            .map_err(|e| format!("Failed to delete plant: {}", e))?;
        if affected > 0 {
            info!("Deleted plant {}", id);
        }
        Ok(affected > 0)
    }

    fn query(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<SavedPlant>, String> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| format!("Failed to prepare query: {}", e))?;

        let rows = stmt
            .query_map(args, |row| {
                Ok(PlantRow {
                    id: row.get(0)?,
                    created_date: row.get(1)?,
                    common_name: row.get(2)?,
                    species_name: row.get(3)?,
                    description: row.get(4)?,
                    image_url: row.get(5)?,
                    health_status: row.get(6)?,
                    health_analysis_json: row.get(7)?,
                    care_tips_json: row.get(8)?,
                })
            })
            .map_err(|e| format!("Failed to query plants: {}", e))?;

        let rows = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("Failed to collect plants: {}", e))?;

        rows.into_iter().map(PlantRow::into_saved).collect()
    }
}

impl PlantRow {
    fn into_saved(self) -> Result<SavedPlant, String> {
        let health_status = HealthStatus::parse(&self.health_status).ok_or_else(|| {
            format!("Plant {} has invalid health status '{}'", self.id, self.health_status)
        })?;
        let health_analysis: HealthAnalysis = serde_json::from_str(&self.health_analysis_json)
            .map_err(|e| format!("Plant {} has corrupt health analysis: {}", self.id, e))?;
        let care_tips: Vec<String> = serde_json::from_str(&self.care_tips_json)
            .map_err(|e| format!("Plant {} has corrupt care tips: {}", self.id, e))?;

        Ok(SavedPlant {
            id: self.id.to_string(),
            created_date: self.created_date,
            record: PlantRecord {
                common_name: self.common_name,
                species_name: self.species_name,
                description: self.description,
                image_url: self.image_url,
                health_status,
                health_analysis,
                care_tips,
            },
        })
    }
}

/// [`PlantStore`] over a local [`GardenStore`] file.
///
/// Opens the database per call on the blocking pool.
#[derive(Debug, Clone)]
pub struct SqlitePlantStore {
    db_path: PathBuf,
}

impl SqlitePlantStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run `f` against the store on the blocking pool.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&GardenStore) -> Result<T, String> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let store = GardenStore::new(&db_path)?;
            f(&store)
        })
        .await
        .map_err(|e| format!("Garden task panicked: {}", e))?
    }
}

#[async_trait]
impl PlantStore for SqlitePlantStore {
    async fn create(&self, record: &PlantRecord) -> Result<String, String> {
        let record = record.clone();
        let id = self.with_store(move |store| store.create(&record)).await?;
        Ok(id.to_string())
    }

    async fn list(&self, order: ListOrder) -> Result<Vec<SavedPlant>, String> {
        self.with_store(move |store| store.list(order)).await
    }

    async fn search(&self, term: &str) -> Result<Vec<SavedPlant>, String> {
        let term = term.to_string();
        self.with_store(move |store| store.search(&term)).await
    }
}
