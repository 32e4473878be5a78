//! Persistence collaborators for custom formations.
//!
//! The store never touches storage directly; it is handed a
//! [`FormationRepository`] at construction.

use crate::error::{PlaybookError, Result};
use crate::models::Formation;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default key-value namespace for saved custom formations.
pub const CUSTOM_FORMATIONS_NAMESPACE: &str = "football-analyzer-custom-formations";

pub trait FormationRepository {
    fn get(&self, id: &str) -> Option<Formation>;

    /// All stored formations in insertion order.
    fn list(&self) -> Vec<Formation>;

    /// Insert, or replace the formation with the same id.
    fn put(&mut self, formation: Formation) -> Result<()>;

    fn remove(&mut self, id: &str) -> Result<bool>;
}

/// In-memory repository. Insertion ordered.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    formations: Vec<Formation>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formations(formations: Vec<Formation>) -> Self {
        Self { formations }
    }

    pub fn len(&self) -> usize {
        self.formations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formations.is_empty()
    }
}

fn upsert(formations: &mut Vec<Formation>, formation: Formation) {
    match formations.iter_mut().find(|f| f.id == formation.id) {
        Some(existing) => *existing = formation,
        None => formations.push(formation),
    }
}

impl FormationRepository for MemoryRepository {
    fn get(&self, id: &str) -> Option<Formation> {
        self.formations.iter().find(|f| f.id == id).cloned()
    }

    fn list(&self) -> Vec<Formation> {
        self.formations.clone()
    }

    fn put(&mut self, formation: Formation) -> Result<()> {
        upsert(&mut self.formations, formation);
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.formations.len();
        self.formations.retain(|f| f.id != id);
        Ok(self.formations.len() != before)
    }
}

/// Key-value style file store: one JSON array per namespace at
/// `<dir>/<namespace>.json`.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    formations: Vec<Formation>,
}

impl JsonFileRepository {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_namespace(dir, CUSTOM_FORMATIONS_NAMESPACE)
    }

    /// A missing file starts empty. A corrupt file also starts empty (and is
    /// overwritten on the next write) rather than failing the whole app.
    pub fn open_namespace(dir: impl AsRef<Path>, namespace: &str) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", namespace));

        let formations = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Vec<Formation>>(&text) {
                Ok(list) => list,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load custom formations");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(PlaybookError::Io(e)),
        };
        debug!(path = %path.display(), count = formations.len(), "opened formation store");

        Ok(Self { path, formations })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `formations` via temp file + rename; memory is only updated by
    /// the caller after this succeeds.
    fn persist(&self, formations: &[Formation]) -> Result<()> {
        let json = serde_json::to_string_pretty(formations)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl FormationRepository for JsonFileRepository {
    fn get(&self, id: &str) -> Option<Formation> {
        self.formations.iter().find(|f| f.id == id).cloned()
    }

    fn list(&self) -> Vec<Formation> {
        self.formations.clone()
    }

    fn put(&mut self, formation: Formation) -> Result<()> {
        let mut next = self.formations.clone();
        upsert(&mut next, formation);
        self.persist(&next)?;
        self.formations = next;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        let next: Vec<Formation> = self.formations.iter().filter(|f| f.id != id).cloned().collect();
        if next.len() == self.formations.len() {
            return Ok(false);
        }
        self.persist(&next)?;
        self.formations = next;
        Ok(true)
    }
}
