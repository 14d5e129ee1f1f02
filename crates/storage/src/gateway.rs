//! Persistence gateway - load, save, export and import of the whole database.

use std::path::Path;
use coursetrack_core::Database;
use tokio::fs;
use tracing::{debug, info, warn};
use crate::schema::{parse_document, ImportError};
use crate::{Result, Storage};

/// Reads and writes the database through a [`Storage`] backend.
pub struct PersistenceGateway<S: Storage> {
    storage: S,
}

impl<S: Storage> PersistenceGateway<S> {
    /// Create a gateway over `storage`.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the stored database.
    ///
    /// Falls back to the default database when nothing is stored or the
    /// stored payload does not validate. Only backend I/O failures are
    /// returned as errors.
    pub async fn load(&self) -> Result<Database> {
        let Some(raw) = self.storage.read().await? else {
            debug!("no stored payload, starting from defaults");
            return Ok(Database::default());
        };

        match parse_document(&raw) {
            Ok(db) => Ok(db),
            Err(e) => {
                warn!(error = %e, "stored payload unreadable, starting from defaults");
                Ok(Database::default())
            }
        }
    }

    /// Persist the whole database, replacing the stored payload.
    pub async fn save(&mut self, db: &Database) -> Result<()> {
        let payload = serde_json::to_string(db)?;
        self.storage.write(&payload).await?;
        debug!(courses = db.courses().len(), "database saved");
        Ok(())
    }

    /// Pretty-printed document for download or versioning.
    pub fn export(&self, db: &Database) -> Result<String> {
        Ok(serde_json::to_string_pretty(db)?)
    }

    /// Write the pretty-printed document to `path`.
    pub async fn export_to(&self, db: &Database, path: impl AsRef<Path>) -> Result<()> {
        let json = self.export(db)?;
        fs::write(path.as_ref(), json.as_bytes()).await?;
        info!(path = %path.as_ref().display(), "database exported");
        Ok(())
    }

    /// Validate `raw`, let `prepare` adjust it, persist it once and return it
    /// as the new database.
    ///
    /// Nothing is written unless the document validates and `prepare`
    /// succeeds. The caller swaps its in-memory database for the returned
    /// one; there is no merge.
    pub async fn import_replace<T, E, F>(
        &mut self,
        raw: &str,
        prepare: F,
    ) -> std::result::Result<(Database, T), E>
    where
        T: Send,
        E: From<ImportError> + Send,
        F: FnOnce(&mut Database) -> std::result::Result<T, E> + Send,
    {
        let mut db = parse_document(raw)?;
        let out = prepare(&mut db)?;
        self.save(&db).await.map_err(ImportError::from)?;
        info!(courses = db.courses().len(), "database imported");
        Ok((db, out))
    }

    /// Read a document to import from `path`.
    pub async fn read_document(
        &self,
        path: impl AsRef<Path>,
    ) -> std::result::Result<String, ImportError> {
        fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| ImportError::Storage(e.into()))
    }

    /// Erase the stored payload. The caller reloads defaults afterwards.
    pub async fn clear(&mut self) -> Result<()> {
        self.storage.remove().await?;
        info!("stored payload cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use coursetrack_core::{Course, CourseSpec, CourseState, MilestoneCatalog};

    async fn import(
        gateway: &mut PersistenceGateway<MemoryStorage>,
        raw: &str,
    ) -> std::result::Result<Database, ImportError> {
        let (db, ()) = gateway.import_replace(raw, |_| Ok::<_, ImportError>(())).await?;
        Ok(db)
    }

    fn sample_db() -> Database {
        let mut db = Database::default();
        let course = Course::new(CourseSpec {
            name: "Working at heights".into(),
            unit: "Maintenance".into(),
            hours: 16.5,
            participants: 12,
            ..Default::default()
        });
        let id = course.id.clone();
        db.insert_course(course).unwrap();
        db.set_state(&id, CourseState::Scheduled).unwrap();
        db.set_flags(&id, [true, false, true, false].into()).unwrap();
        db
    }

    #[tokio::test]
    async fn test_load_defaults_when_empty() {
        let gateway = PersistenceGateway::new(MemoryStorage::new());
        let db = gateway.load().await.unwrap();
        assert!(db.courses().is_empty());
        assert!(db.progress_records().is_empty());
        assert_eq!(db.milestones(), &MilestoneCatalog::default());
    }

    #[tokio::test]
    async fn test_load_defaults_when_corrupt() {
        let gateway = PersistenceGateway::new(MemoryStorage::with_payload("{\"courses\": ["));
        let db = gateway.load().await.unwrap();
        assert_eq!(db, Database::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let mut gateway = PersistenceGateway::new(MemoryStorage::new());
        let db = sample_db();
        gateway.save(&db).await.unwrap();
        assert_eq!(gateway.load().await.unwrap(), db);
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let mut gateway = PersistenceGateway::new(MemoryStorage::new());
        let db = sample_db();

        let exported = gateway.export(&db).unwrap();
        assert!(exported.contains('\n'));

        let imported = import(&mut gateway, &exported).await.unwrap();
        assert_eq!(imported, db);
        assert_eq!(gateway.load().await.unwrap(), db);
    }

    #[tokio::test]
    async fn test_failed_import_leaves_payload_untouched() {
        let handle = MemoryStorage::new();
        let mut gateway = PersistenceGateway::new(handle.clone());
        let db = sample_db();
        gateway.save(&db).await.unwrap();
        let before = handle.payload().await;

        assert!(matches!(
            import(&mut gateway, "not json at all").await,
            Err(ImportError::Parse(_))
        ));
        assert!(matches!(
            import(&mut gateway, "\"a string\"").await,
            Err(ImportError::NotAnObject(_))
        ));
        assert_eq!(handle.payload().await, before);
    }

    #[tokio::test]
    async fn test_import_reports_write_failure() {
        let handle = MemoryStorage::new();
        let mut gateway = PersistenceGateway::new(handle.clone());
        handle.set_fail_writes(true);

        let err = import(&mut gateway, "{}").await.unwrap_err();
        assert!(matches!(err, ImportError::Storage(_)));
        assert!(handle.payload().await.is_none());
    }

    #[tokio::test]
    async fn test_export_to_and_read_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::EXPORT_FILE_NAME);
        let mut gateway = PersistenceGateway::new(MemoryStorage::new());
        let db = sample_db();

        gateway.export_to(&db, &path).await.unwrap();
        let raw = gateway.read_document(&path).await.unwrap();
        assert_eq!(import(&mut gateway, &raw).await.unwrap(), db);

        let missing = gateway.read_document(dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(ImportError::Storage(_))));
    }

    #[tokio::test]
    async fn test_rejected_preparation_writes_nothing() {
        let handle = MemoryStorage::new();
        let mut gateway = PersistenceGateway::new(handle.clone());

        let result = gateway
            .import_replace("{}", |_| Err::<(), _>(ImportError::NotAnObject("refused")))
            .await;
        assert!(matches!(result, Err(ImportError::NotAnObject("refused"))));
        assert!(handle.payload().await.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let handle = MemoryStorage::new();
        let mut gateway = PersistenceGateway::new(handle.clone());
        gateway.save(&sample_db()).await.unwrap();
        gateway.clear().await.unwrap();
        assert!(handle.payload().await.is_none());
        assert_eq!(gateway.load().await.unwrap(), Database::default());
    }
}
