use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::db::DatabaseProxy;
use crate::entries::EntrySchema;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db_proxy: Arc<DatabaseProxy>,
    schema: EntrySchema,
    max_page_limit: Option<i64>,
}

impl AppState {
    pub fn new(db_proxy: Arc<DatabaseProxy>, schema: EntrySchema, max_page_limit: Option<i64>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db_proxy,
            schema,
            max_page_limit,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db_proxy(&self) -> Arc<DatabaseProxy> {
        Arc::clone(&self.db_proxy)
    }

    pub fn schema(&self) -> EntrySchema {
        self.schema
    }

    pub fn max_page_limit(&self) -> Option<i64> {
        self.max_page_limit
    }
}
