use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::error::AppError;

/// Failure surface of the entity store. The only variant handlers care to
/// distinguish is `Conflict`: PostgREST answers 409 when an insert trips a
/// unique index, and that is the sole enforcement point for the
/// one-active-mapping-per-pair invariant.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("conflicting row: {0}")]
    Conflict(String),

    #[error("store rejected request ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("could not decode store response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other.to_string()),
        }
    }
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
            );
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None)
            .await
    }

    /// Same as [`request`](Self::request) but with extra headers, used for
    /// PostgREST `Prefer: return=representation` writes.
    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Store error ({}): {}", status, body);

            return Err(match status {
                StatusCode::CONFLICT => StoreError::Conflict(body),
                _ => StoreError::Api { status, body },
            });
        }

        let bytes = response.bytes().await?;
        let data = serde_json::from_slice(&bytes)?;
        Ok(data)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// Header map requesting that PostgREST return the affected rows.
pub fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_models::error::AppError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(url: String) -> AppConfig {
        AppConfig {
            supabase_url: url,
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_jwt_secret: "test-secret".to_string(),
            port: 0,
        }
    }

    #[tokio::test]
    async fn unique_violation_surfaces_as_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/mappings"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint"
            })))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&test_config(server.uri()));
        let result: Result<Vec<Value>, StoreError> = client
            .request(
                Method::POST,
                "/rest/v1/mappings",
                Some("token"),
                Some(json!({})),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn success_body_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/doctors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&test_config(server.uri()));
        let rows: Vec<Value> = client
            .request(Method::GET, "/rest/v1/doctors", Some("token"), None)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn conflict_maps_to_conflict_app_error() {
        let err = StoreError::Conflict("duplicate key value".to_string());
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    #[test]
    fn other_store_errors_map_to_database() {
        let err = StoreError::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert!(matches!(AppError::from(err), AppError::Database(_)));
    }
}
