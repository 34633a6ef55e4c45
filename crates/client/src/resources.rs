//! Typed endpoints for each console module.
//!
//! [`ResourceApi`] covers the collection CRUD every module shares; the
//! module-specific endpoints (suspension, Aadhaar upload, exports,
//! competition entries, auth, dashboard) hang off it or off
//! [`ApiClient`] directly.

use std::marker::PhantomData;

use clubdesk_core::entities::{
    Club, Competition, DashboardStats, Editable, Player, Referee, Resource,
};
use clubdesk_core::error::CoreError;
use clubdesk_core::list::{ListQuery, ListResult};
use clubdesk_core::session::{LoginRequest, LoginResponse};
use clubdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{decode_payload, ApiClient};
use crate::error::{ApiError, ApiResult};

/// Filter keys understood by the activity-log endpoint.
pub mod activity_filters {
    pub const ENTITY_TYPE: &str = "entityType";
    pub const ACTION: &str = "action";
    pub const FROM: &str = "from";
    pub const TO: &str = "to";
}

/// Multipart field carrying an Aadhaar card image.
pub const AADHAR_UPLOAD_FIELD: &str = "aadharImage";

// ---------------------------------------------------------------------------
// Collection CRUD
// ---------------------------------------------------------------------------

/// Endpoints of one collection, borrowed from an [`ApiClient`].
pub struct ResourceApi<'a, E> {
    api: &'a ApiClient,
    _marker: PhantomData<fn() -> E>,
}

impl ApiClient {
    /// Typed access to the collection of `E`.
    pub fn resource<E: Resource>(&self) -> ResourceApi<'_, E> {
        ResourceApi {
            api: self,
            _marker: PhantomData,
        }
    }
}

impl<'a, E: Resource> ResourceApi<'a, E> {
    fn item_path(id: DbId) -> String {
        format!("{}/{id}", E::COLLECTION)
    }

    /// One page of the collection, served from the query cache when a
    /// fresh entry exists for this query.
    pub async fn list(&self, query: &ListQuery) -> ApiResult<ListResult<E>> {
        let signature = query.signature();
        if let Some(cached) = self.api.cache().get_fresh(E::COLLECTION, &signature) {
            tracing::debug!(collection = E::COLLECTION, %signature, "List served from cache");
            return decode_payload(cached);
        }
        self.list_fresh(query).await
    }

    /// One page of the collection, always from the server.
    pub async fn list_fresh(&self, query: &ListQuery) -> ApiResult<ListResult<E>> {
        let raw: Value = self.api.get(E::COLLECTION, &query.to_params()).await?;
        let page: ListResult<E> = decode_payload(raw.clone())?;
        self.api
            .cache()
            .insert(E::COLLECTION, &query.signature(), raw);
        Ok(page)
    }

    /// One record; a 404 becomes [`CoreError::NotFound`].
    pub async fn get(&self, id: DbId) -> ApiResult<E> {
        self.api
            .get(&Self::item_path(id), &[])
            .await
            .map_err(|e| match e {
                ApiError::Api { status: 404, .. } => CoreError::NotFound {
                    entity: E::LABEL,
                    id,
                }
                .into(),
                other => other,
            })
    }

    pub async fn delete(&self, id: DbId) -> ApiResult<()> {
        self.api.delete(&Self::item_path(id)).await?;
        tracing::info!(collection = E::COLLECTION, id, "Deleted record");
        self.invalidate();
        Ok(())
    }

    /// Mark every cached page of this collection stale.
    pub fn invalidate(&self) -> usize {
        self.api.cache().invalidate(E::COLLECTION)
    }
}

impl<'a, E: Editable> ResourceApi<'a, E> {
    /// `POST <collection>` with the draft as body.
    pub async fn create(&self, draft: &E::Draft) -> ApiResult<E> {
        let created: E = self.api.post(E::COLLECTION, draft).await?;
        tracing::info!(collection = E::COLLECTION, id = created.id(), "Created record");
        self.invalidate();
        Ok(created)
    }

    /// `PUT <collection>/{id}` with the draft as body.
    pub async fn update(&self, id: DbId, draft: &E::Draft) -> ApiResult<E> {
        let updated: E = self.api.put(&Self::item_path(id), draft).await?;
        tracing::info!(collection = E::COLLECTION, id, "Updated record");
        self.invalidate();
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl ExportFormat {
    /// Path segment after `export/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "excel",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "xlsx",
        }
    }

    /// Default download name for a collection, e.g. `players.xlsx`.
    pub fn file_name(&self, collection: &str) -> String {
        format!("{collection}.{}", self.file_extension())
    }
}

/// Collections the server can export.
pub trait Exportable: Resource {}

impl Exportable for Club {}
impl Exportable for Player {}
impl Exportable for Referee {}

impl<'a, E: Exportable> ResourceApi<'a, E> {
    /// `GET <collection>/export/<format>` with the list filters applied.
    pub async fn export(&self, format: ExportFormat, query: &ListQuery) -> ApiResult<Vec<u8>> {
        let path = format!("{}/export/{}", E::COLLECTION, format.as_str());
        let bytes = self.api.download(&path, &query.to_params()).await?;
        tracing::info!(collection = E::COLLECTION, format = format.as_str(), bytes = bytes.len(), "Exported collection");
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Module-specific endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuspensionBody {
    is_suspended: bool,
}

impl<'a> ResourceApi<'a, Player> {
    /// `PATCH players/{id}/suspension`.
    pub async fn set_suspended(&self, id: DbId, suspended: bool) -> ApiResult<Player> {
        let path = format!("{}/{id}/suspension", Player::COLLECTION);
        let player: Player = self
            .api
            .patch(&path, &SuspensionBody { is_suspended: suspended })
            .await?;
        tracing::info!(id, suspended, "Changed player suspension");
        self.invalidate();
        Ok(player)
    }

    /// Upload an Aadhaar card image for verification.
    pub async fn upload_aadhar(
        &self,
        id: DbId,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> ApiResult<Player> {
        let path = format!("{}/{id}/aadhar", Player::COLLECTION);
        let player: Player = self
            .api
            .upload(&path, AADHAR_UPLOAD_FIELD, file_name, bytes, mime)
            .await?;
        tracing::info!(id, verified = player.aadhar_verified, "Uploaded Aadhaar image");
        self.invalidate();
        Ok(player)
    }
}

impl<'a> ResourceApi<'a, Competition> {
    /// Players registered for a competition.
    pub async fn players(&self, id: DbId) -> ApiResult<Vec<Player>> {
        let path = format!("{}/{id}/players", Competition::COLLECTION);
        self.api.get(&path, &[]).await
    }
}

/// Body of `GET health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl ApiClient {
    /// `POST auth/login`. The caller persists the returned session and
    /// attaches its token.
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        request.check()?;
        let response: LoginResponse = self.post("auth/login", request).await?;
        tracing::info!(email = %response.user.email, role = %response.user.role, "Signed in");
        Ok(response)
    }

    /// `POST auth/logout`, then drop every cached query.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self.post_empty("auth/logout").await;
        self.cache().clear();
        result
    }

    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.get("dashboard/stats", &[]).await
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.get("health", &[]).await
    }
}
