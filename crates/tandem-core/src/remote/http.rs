//! HTTP remote record store
//!
//! Speaks JSON to a generic record service:
//!
//! - `POST   {base}/records/{type}`  create, body = fields, response `{"id": ...}`
//! - `PATCH  {base}/records/{id}`    merge fields into a record
//! - `DELETE {base}/records/{id}`
//! - `GET    {base}/records/{type}?field={f}&value={v}`  predicate query
//!
//! Timeouts and retries are the service's concern; every transport or
//! status failure surfaces as `RemoteError::Unavailable` so callers can
//! show a retry-capable message.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Fields, Record, RecordId, RecordType, RemoteError, RemoteStore};

/// HTTP implementation of [`RemoteStore`]
pub struct HttpRemote {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CreateResponse {
    id: String,
}

#[derive(Deserialize)]
struct QueryRow {
    id: String,
    fields: Fields,
}

impl HttpRemote {
    /// Create a client for the record service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn unavailable(err: reqwest::Error) -> RemoteError {
        RemoteError::Unavailable(err.to_string())
    }

    fn check_status(
        response: reqwest::Response,
        id: Option<&RecordId>,
    ) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(RemoteError::NotFound(id.clone()));
            }
        }
        if !status.is_success() {
            return Err(RemoteError::Unavailable(format!(
                "record service returned {}",
                status
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn create(
        &self,
        record_type: RecordType,
        fields: Fields,
    ) -> Result<RecordId, RemoteError> {
        let url = format!("{}/records/{}", self.base_url, record_type);
        let response = self
            .client
            .post(&url)
            .json(&fields)
            .send()
            .await
            .map_err(Self::unavailable)?;
        let response = Self::check_status(response, None)?;

        let body: CreateResponse = response.json().await.map_err(Self::unavailable)?;
        Ok(RecordId::new(body.id))
    }

    async fn update(&self, id: &RecordId, fields: Fields) -> Result<(), RemoteError> {
        let url = format!("{}/records/{}", self.base_url, id);
        let response = self
            .client
            .patch(&url)
            .json(&fields)
            .send()
            .await
            .map_err(Self::unavailable)?;
        Self::check_status(response, Some(id))?;
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError> {
        let url = format!("{}/records/{}", self.base_url, id);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(Self::unavailable)?;
        Self::check_status(response, Some(id))?;
        Ok(())
    }

    async fn query(
        &self,
        record_type: RecordType,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<Record>, RemoteError> {
        let url = format!("{}/records/{}", self.base_url, record_type);
        let value_param = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let response = self
            .client
            .get(&url)
            .query(&[("field", field), ("value", value_param.as_str())])
            .send()
            .await
            .map_err(Self::unavailable)?;
        let response = Self::check_status(response, None)?;

        let rows: Vec<QueryRow> = response.json().await.map_err(Self::unavailable)?;
        Ok(rows
            .into_iter()
            .map(|row| Record {
                id: RecordId::new(row.id),
                fields: row.fields,
            })
            .collect())
    }
}
