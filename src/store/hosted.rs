//! Hosted database store: PostgREST-style REST endpoint.
//!
//! - `GET    /rest/v1/{table}?select=*&order=created_at.desc`
//! - `POST   /rest/v1/{table}`            (`Prefer: return=representation`)
//! - `PATCH  /rest/v1/{table}?id=eq.{id}` (`Prefer: return=representation`)
//! - `DELETE /rest/v1/{table}?id=eq.{id}`
//!
//! Every request carries the access key as `apikey` and as a bearer token.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use super::{
    decode_body, decode_rows, rejection, transport_error, BackendKind, HospitalStore, StoreError,
};
use crate::config::HostedConfig;
use crate::models::{Hospital, HospitalPatch, NewHospital};

const REST_PREFIX: &str = "rest/v1";
const RETURN_REPRESENTATION: &str = "return=representation";

pub struct HostedStore {
    base_url: String,
    table: String,
    client: reqwest::Client,
    headers: HeaderMap,
}

impl HostedStore {
    pub fn new(config: &HostedConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Self::new_unchecked(&config.url, &config.anon_key, &config.table)
    }

    /// Skip the startup check (plain-http test doubles).
    pub(crate) fn new_unchecked(url: &str, key: &str, table: &str) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(key)
            .map_err(|_| StoreError::Http("access key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| StoreError::Http("access key is not a valid header value".into()))?;
        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            client: super::http_client()?,
            headers,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{REST_PREFIX}/{}", self.base_url, self.table)
    }

    /// Rows written back by an insert or update. Decoded strictly.
    async fn rows(&self, response: reqwest::Response) -> Result<Vec<Hospital>, StoreError> {
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        decode_body(response).await
    }

    /// Exactly one row back, or the matching error.
    fn single(id: &str, rows: Vec<Hospital>) -> Result<Hospital, StoreError> {
        let count = rows.len();
        let mut rows = rows.into_iter();
        match (rows.next(), count) {
            (Some(row), 1) => Ok(row),
            (None, _) => Err(StoreError::NotFound(id.to_string())),
            _ => Err(StoreError::NotUnique {
                id: id.to_string(),
                count,
            }),
        }
    }
}

#[async_trait]
impl HospitalStore for HostedStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Hosted
    }

    async fn list(&self) -> Result<Vec<Hospital>, StoreError> {
        let response = self
            .client
            .get(self.table_url())
            .headers(self.headers.clone())
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await
            .map_err(|e| transport_error(e, &self.base_url))?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        decode_rows(response).await
    }

    async fn create(&self, payload: &NewHospital) -> Result<Hospital, StoreError> {
        let response = self
            .client
            .post(self.table_url())
            .headers(self.headers.clone())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(payload)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.base_url))?;

        let rows = self.rows(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::ResponseParsing("insert returned no row".into()))
    }

    async fn update(&self, id: &str, patch: &HospitalPatch) -> Result<Hospital, StoreError> {
        let response = self
            .client
            .patch(self.table_url())
            .headers(self.headers.clone())
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("id", format!("eq.{id}"))])
            .json(patch)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.base_url))?;

        let rows = self.rows(response).await?;
        Self::single(id, rows)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.table_url())
            .headers(self.headers.clone())
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(|e| transport_error(e, &self.base_url))?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}
