use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::db::config::DbConfig;
use crate::entries::EntrySchema;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub entry_schema: EntrySchema,
    pub max_page_limit: Option<i64>,
    pub db: DbConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let entry_schema = std::env::var("ENTRY_SCHEMA")
            .ok()
            .as_deref()
            .and_then(EntrySchema::parse)
            .unwrap_or(EntrySchema::Rich);

        let max_page_limit = std::env::var("MAX_PAGE_LIMIT")
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|value| *value >= 1);

        Self {
            host,
            port,
            log_level,
            entry_schema,
            max_page_limit,
            db: DbConfig::from_env(),
        }
    }

    /// Configuration for an isolated in-memory service.
    pub fn in_memory(entry_schema: EntrySchema) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            log_level: "info".to_string(),
            entry_schema,
            max_page_limit: None,
            db: DbConfig::in_memory(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
