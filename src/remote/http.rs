use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app::{Result, ShelfError};
use crate::config::ApiConfig;
use crate::domain::{ActionRequest, StateFilter};
use crate::remote::{AddRequest, AddResponse, RemoteClient, RetrieveResponse, SendResponse};

pub struct HttpRemote {
    client: Client,
    base_url: String,
    consumer_key: String,
    access_token: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    consumer_key: &'a str,
    access_token: &'a str,
}

#[derive(Serialize)]
struct RetrieveBody<'a> {
    #[serde(flatten)]
    credentials: Credentials<'a>,
    state: StateFilter,
    #[serde(rename = "detailType")]
    detail_type: &'static str,
    sort: &'static str,
}

#[derive(Serialize)]
struct SendBody<'a> {
    #[serde(flatten)]
    credentials: Credentials<'a>,
    actions: &'a [ActionRequest],
}

#[derive(Serialize)]
struct AddBody<'a> {
    #[serde(flatten)]
    credentials: Credentials<'a>,
    #[serde(flatten)]
    request: &'a AddRequest,
}

impl HttpRemote {
    pub fn new(config: &ApiConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("X-Accept", HeaderValue::from_static("application/json"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=UTF-8"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .default_headers(headers)
            .user_agent("linkshelf/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            consumer_key: config.consumer_key.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn credentials(&self) -> Result<Credentials<'_>> {
        if self.consumer_key.is_empty() || self.access_token.is_empty() {
            return Err(ShelfError::NotAuthenticated);
        }
        Ok(Credentials {
            consumer_key: &self.consumer_key,
            access_token: &self.access_token,
        })
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/v3/{}", self.base_url, endpoint);
        let body = serde_json::to_vec(body)?;

        let response = self.client.post(&url).body(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .headers()
                .get("X-Error")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("no error detail")
                .to_string();
            return Err(ShelfError::Remote(format!("{} ({})", status, reason)));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ShelfError::MalformedPayload(format!("{} response: {}", endpoint, e)))
    }
}

#[async_trait]
impl RemoteClient for HttpRemote {
    async fn fetch(&self, state: StateFilter) -> Result<RetrieveResponse> {
        let body = RetrieveBody {
            credentials: self.credentials()?,
            state,
            detail_type: "complete",
            sort: "newest",
        };
        tracing::debug!("Retrieving {:?} items", state);
        self.post("get", &body).await
    }

    async fn submit(&self, actions: &[ActionRequest]) -> Result<SendResponse> {
        let body = SendBody {
            credentials: self.credentials()?,
            actions,
        };
        tracing::debug!("Sending {} action(s)", actions.len());
        self.post("send", &body).await
    }

    async fn add(&self, request: &AddRequest) -> Result<AddResponse> {
        let body = AddBody {
            credentials: self.credentials()?,
            request,
        };
        tracing::debug!("Adding {}", request.url);
        self.post("add", &body).await
    }
}
