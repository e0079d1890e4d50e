//! HTTP JSON API store.
//!
//! Four routes under a base URL: `GET /hospitals`, `POST /hospitals`,
//! `PUT /hospitals/{id}`, `DELETE /hospitals/{id}`. Any non-2xx status is a
//! failure; the message is pulled from the body when possible.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use super::{
    decode_body, decode_rows, rejection, transport_error, BackendKind, HospitalStore, StoreError,
};
use crate::config::ConfigError;
use crate::models::{Hospital, HospitalPatch, NewHospital};

pub struct HttpApiStore {
    base_url: String,
    collection: Url,
    client: reqwest::Client,
}

impl HttpApiStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let collection = Url::parse(&format!("{base_url}/hospitals"))
            .map_err(|_| ConfigError::InvalidApiUrl(base_url.clone()))?;
        if collection.cannot_be_a_base() {
            return Err(ConfigError::InvalidApiUrl(base_url).into());
        }

        Ok(Self {
            base_url,
            collection,
            client: super::http_client()?,
        })
    }

    /// `{base}/hospitals/{id}` with `id` encoded as a single path segment.
    fn record_url(&self, id: &str) -> Result<Url, StoreError> {
        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Http("base URL cannot carry a path".into()))?
            .push(id);
        Ok(url)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        decode_body(response).await
    }
}

#[async_trait]
impl HospitalStore for HttpApiStore {
    fn backend(&self) -> BackendKind {
        BackendKind::HttpApi
    }

    async fn list(&self) -> Result<Vec<Hospital>, StoreError> {
        let response = self
            .client
            .get(self.collection.clone())
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
            .post(self.collection.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.base_url))?;
        self.parse(response).await
    }

    async fn update(&self, id: &str, patch: &HospitalPatch) -> Result<Hospital, StoreError> {
        let response = self
            .client
            .put(self.record_url(id)?)
            .json(patch)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.base_url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.parse(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.record_url(id)?)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.base_url))?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}
