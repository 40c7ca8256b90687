use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, StoryError};
use crate::content::{ContentProvider, MockProvider, PoolProvider, UserSource};
use crate::interaction::InteractionStore;
use crate::store::{MemoryStore, SqliteStore, Store};

/// Wires persistence, interaction state and content together.
pub struct AppContext {
    pub interactions: Arc<InteractionStore>,
    pub provider: Arc<dyn ContentProvider>,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, source: UserSource) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&db_path)?);
        let provider: Arc<dyn ContentProvider> = Arc::new(PoolProvider::new(&source));
        Ok(Self::from_parts(store, provider))
    }

    /// Fixed mock content over an in-memory store.
    pub fn preview() -> Self {
        Self::from_parts(Arc::new(MemoryStore::new()), Arc::new(MockProvider::new()))
    }

    pub fn from_parts(store: Arc<dyn Store>, provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            interactions: Arc::new(InteractionStore::new(store)),
            provider,
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StoryError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("storyreel");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("storyreel.db"))
    }
}
