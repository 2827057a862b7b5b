//! Administration endpoints (REST sessions only).
//!
//! Thin typed pass-throughs over the server's admin API: plain request and
//! response, no client-side state machine.

use std::sync::Arc;

use reqwest::Method;
use tracing::info;

use crate::error::{Error, Result};
use crate::http::RequestBody;
use crate::models::{DatastoreEntry, ServerStatus, SessionEntry};
use crate::session::rest::SessionCore;

pub struct AdministrationManager {
    core: Arc<SessionCore>,
}

impl AdministrationManager {
    pub(crate) fn new(core: Arc<SessionCore>) -> Self {
        Self { core }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, sub_path: &str) -> Result<Option<T>> {
        let url = self.core.build_url(sub_path, &[])?;
        let material = self.core.request_material().await?;
        self.core
            .executor()
            .request(Method::GET, url, &material, RequestBody::None)
            .await
    }

    /// Server health and version information.
    pub async fn server_status(&self) -> Result<ServerStatus> {
        self.get("admin/server/status")
            .await?
            .ok_or_else(|| Error::Codec("server status response was empty".into()))
    }

    /// The server configuration as an opaque JSON document.
    pub async fn fetch_config(&self) -> Result<serde_json::Value> {
        Ok(self
            .get("admin/server/config")
            .await?
            .unwrap_or(serde_json::Value::Null))
    }

    /// Replace the server configuration.
    pub async fn update_config(&self, config: serde_json::Value) -> Result<()> {
        let url = self.core.build_url("admin/server/config", &[])?;
        let material = self.core.request_material().await?;
        let _: Option<serde_json::Value> = self
            .core
            .executor()
            .request(Method::PUT, url, &material, RequestBody::Json(config))
            .await?;
        info!("updated server configuration");
        Ok(())
    }

    /// Fetch a datastore entry by group name.
    pub async fn datastore(&self, group: &str) -> Result<DatastoreEntry> {
        self.get(&format!("admin/datastore/{group}"))
            .await?
            .ok_or_else(|| Error::Codec(format!("datastore group '{group}' response was empty")))
    }

    /// Store a datastore entry.
    pub async fn store_datastore(&self, entry: &DatastoreEntry) -> Result<()> {
        let url = self.core.build_url("admin/datastore", &[])?;
        let material = self.core.request_material().await?;
        let _: Option<serde_json::Value> = self
            .core
            .executor()
            .request(
                Method::POST,
                url,
                &material,
                RequestBody::Json(serde_json::to_value(entry)?),
            )
            .await?;
        Ok(())
    }

    /// Delete a datastore entry by group name.
    pub async fn delete_datastore(&self, group: &str) -> Result<()> {
        let url = self.core.build_url(&format!("admin/datastore/{group}"), &[])?;
        let material = self.core.request_material().await?;
        let _: Option<serde_json::Value> = self
            .core
            .executor()
            .request(Method::DELETE, url, &material, RequestBody::None)
            .await?;
        Ok(())
    }

    /// List the server-side sessions.
    pub async fn sessions(&self) -> Result<Vec<SessionEntry>> {
        Ok(self.get("admin/sessions").await?.unwrap_or_default())
    }

    /// Terminate a server-side session by id.
    pub async fn close_session(&self, session_id: &str) -> Result<()> {
        let url = self
            .core
            .build_url(&format!("admin/sessions/{session_id}"), &[])?;
        let material = self.core.request_material().await?;
        let _: Option<serde_json::Value> = self
            .core
            .executor()
            .request(Method::DELETE, url, &material, RequestBody::None)
            .await?;
        info!("closed server session {}", session_id);
        Ok(())
    }
}
