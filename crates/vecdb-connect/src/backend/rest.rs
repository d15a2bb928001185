//! Managed-cloud backend over the service's REST API.
//!
//! Every request runs on the connection's worker pool. Failures are reported
//! as they come back; this client does not retry.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};
use vecdb_types::ReadConsistency;

use crate::backend::RemoteBackend;
use crate::connection::{validate_table_name, Connection, TableRef};
use crate::error::ConnectError;
use crate::options::RemoteConfig;
use crate::pool::WorkerPool;

/// Page size used when listing tables.
const LIST_PAGE_SIZE: usize = 100;

/// Upper bound on pages fetched by one listing.
const MAX_LIST_PAGES: usize = 10_000;

/// Constructor for [`RestDatabase`] sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestBackend;

impl RestBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RemoteBackend for RestBackend {
    fn construct(
        &self,
        config: &RemoteConfig,
        pool: Arc<WorkerPool>,
    ) -> Result<Box<dyn Connection>, ConnectError> {
        if config.database().is_empty() {
            return Err(ConnectError::BackendConstruction(format!(
                "no database name in {}",
                config.uri()
            )));
        }
        if pool.is_shutdown() {
            return Err(ConnectError::BackendConstruction(
                "request thread pool has already been shut down".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(config.options.connection_timeout)
            .timeout(config.options.read_timeout)
            .build()
            .map_err(|e| ConnectError::BackendConstruction(e.to_string()))?;

        let base_url = config.base_url();
        info!(
            database = config.database(),
            region = %config.region,
            base_url = %base_url,
            "Opened managed-cloud session"
        );

        Ok(Box::new(RestDatabase {
            client,
            base_url,
            uri: config.uri().to_string(),
            database: config.database().to_string(),
            api_key: SecretString::from(config.api_key.expose_secret().to_string()),
            pool,
        }))
    }
}

#[derive(Deserialize)]
struct ListTablesResponse {
    tables: Vec<String>,
    #[serde(default)]
    page_token: Option<String>,
}

/// A managed-cloud database session.
pub struct RestDatabase {
    client: Client,
    base_url: String,
    uri: String,
    database: String,
    api_key: SecretString,
    pool: Arc<WorkerPool>,
}

impl RestDatabase {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request on the worker pool and return status and body.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<(StatusCode, String), ConnectError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Sending request");

        let request = self
            .client
            .request(method, &url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("x-lancedb-database", &self.database)
            .query(&query);

        let exchange = async move {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        Ok(self.pool.run(exchange).await??)
    }

    fn table_ref(&self, name: &str) -> TableRef {
        TableRef {
            name: name.to_string(),
            uri: format!("{}/{}", self.uri.trim_end_matches('/'), name),
            read_consistency: ReadConsistency::Strong,
        }
    }

    async fn table_request(&self, name: &str, action: &str) -> Result<(), ConnectError> {
        validate_table_name(name)?;
        let path = format!("/v1/table/{name}/{action}/");
        let (status, body) = self.send(Method::POST, &path, Vec::new()).await?;
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ConnectError::TableNotFound(name.to_string())),
            StatusCode::CONFLICT => Err(ConnectError::TableAlreadyExists(name.to_string())),
            s => Err(http_error(s, body)),
        }
    }
}

fn http_error(status: StatusCode, body: String) -> ConnectError {
    ConnectError::Http {
        status: status.as_u16(),
        message: body,
    }
}

#[async_trait]
impl Connection for RestDatabase {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn table_names(&self) -> Result<Vec<String>, ConnectError> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        for _ in 0..MAX_LIST_PAGES {
            let mut query = vec![("limit", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("page_token", token));
            }

            let (status, body) = self.send(Method::GET, "/v1/table/", query).await?;
            if !status.is_success() {
                return Err(http_error(status, body));
            }
            let page: ListTablesResponse = serde_json::from_str(&body).map_err(|e| {
                ConnectError::Http {
                    status: status.as_u16(),
                    message: format!("unexpected list response: {e}"),
                }
            })?;

            let page_len = page.tables.len();
            names.extend(page.tables);
            match page.page_token.filter(|token| !token.is_empty()) {
                Some(token) if page_len > 0 => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(ConnectError::Http {
                            status: status.as_u16(),
                            message: format!("table listing repeated page token {token:?}"),
                        });
                    }
                    page_token = Some(token);
                }
                _ => {
                    names.sort();
                    return Ok(names);
                }
            }
        }

        Err(ConnectError::Http {
            status: StatusCode::OK.as_u16(),
            message: format!("table listing exceeded {MAX_LIST_PAGES} pages"),
        })
    }

    async fn open_table(&self, name: &str) -> Result<TableRef, ConnectError> {
        self.table_request(name, "describe").await?;
        Ok(self.table_ref(name))
    }

    async fn create_table(&self, name: &str) -> Result<TableRef, ConnectError> {
        self.table_request(name, "create").await?;
        info!(table = name, database = %self.database, "Created table");
        Ok(self.table_ref(name))
    }

    async fn drop_table(&self, name: &str) -> Result<(), ConnectError> {
        self.table_request(name, "drop").await?;
        info!(table = name, database = %self.database, "Dropped table");
        Ok(())
    }
}
