use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::drafts::DraftStore;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub drafts: Arc<Mutex<DraftStore>>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let ttl = std::time::Duration::from_secs(config.auth.draft_minutes * 60);
        Self {
            db,
            config,
            drafts: Arc::new(Mutex::new(DraftStore::new(ttl))),
        }
    }
}
