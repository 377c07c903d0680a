//! Where service calls go: endpoint, database and (for ingestion) table.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("database name must not be empty")]
    EmptyDatabase,
    #[error("table name must not be empty")]
    EmptyTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    pub endpoint: Url,
    pub database: String,
    pub table: Option<String>,
}

impl ServiceTarget {
    pub fn new(endpoint: &str, database: &str) -> Result<Self, TargetError> {
        let url = Url::parse(endpoint).map_err(|e| TargetError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(TargetError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        let database = database.trim();
        if database.is_empty() {
            return Err(TargetError::EmptyDatabase);
        }
        Ok(Self {
            endpoint: url,
            database: database.to_string(),
            table: None,
        })
    }

    pub fn with_table(mut self, table: &str) -> Result<Self, TargetError> {
        let table = table.trim();
        if table.is_empty() {
            return Err(TargetError::EmptyTable);
        }
        self.table = Some(table.to_string());
        Ok(self)
    }
}
