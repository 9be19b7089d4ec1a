use crate::config::{Config, Credentials};
use crate::error::{InspectorError, ServiceError};
use crate::models::{Operation, Params};
use crate::signing::{SignableRequest, SigningParams, sign};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

const SERVICE_NAME: &str = "inspector2";
const JSON_CONTENT_TYPE: &str = "application/json";

/// The seam between the wrapper and whatever answers inspector2 calls.
#[async_trait]
pub trait InspectorApi: Send + Sync {
    async fn call(&self, operation: Operation, params: Params) -> Result<Value, InspectorError>;
}

/// Signed REST-JSON client for the inspector2 service.
pub struct HttpInspectorClient {
    http: reqwest::Client,
    endpoint: Url,
    region: String,
    credentials: Credentials,
}

impl HttpInspectorClient {
    pub fn new(config: &Config, credentials: Credentials) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&config.effective_endpoint())?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            region: config.region.clone(),
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn host_header(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    fn operation_url(&self, operation: Operation) -> Url {
        let mut url = self.endpoint.clone();
        let base = self.endpoint.path().trim_end_matches('/');
        url.set_path(&format!("{base}{}", operation.http_path()));
        url
    }
}

#[async_trait]
impl InspectorApi for HttpInspectorClient {
    async fn call(&self, operation: Operation, params: Params) -> Result<Value, InspectorError> {
        let body = serde_json::to_vec(&params)?;
        let url = self.operation_url(operation);
        let host = self.host_header();

        let signed = sign(
            &SignableRequest {
                method: "POST",
                host: &host,
                path: url.path(),
                headers: &[("content-type", JSON_CONTENT_TYPE)],
                payload: &body,
            },
            &SigningParams {
                credentials: &self.credentials,
                region: &self.region,
                service: SERVICE_NAME,
                time: chrono::Utc::now(),
            },
        )?;

        let invocation_id = Uuid::new_v4();
        tracing::debug!(%operation, %invocation_id, url = %url, "Sending request");

        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization)
            .header("amz-sdk-invocation-id", invocation_id.to_string())
            .body(body);
        if let Some(ref token) = signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Object(Params::new()));
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let error = parse_error(status.as_u16(), &headers, &bytes);
        tracing::debug!(
            %operation,
            code = %error.code,
            status = status.as_u16(),
            "Service returned an error"
        );
        Err(InspectorError::Service(error))
    }
}

/// Builds a `ServiceError` from a non-2xx response.
fn parse_error(status: u16, headers: &HeaderMap, body: &[u8]) -> ServiceError {
    let json: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let field = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| json.get(*name).and_then(Value::as_str))
            .map(str::to_string)
    };

    let raw_code = headers
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| field(&["__type", "code", "Code"]))
        .unwrap_or_else(|| format!("Http{status}"));

    let message = field(&["message", "Message"]).unwrap_or_else(|| {
        if json.is_null() {
            String::from_utf8_lossy(body).trim().to_string()
        } else {
            String::new()
        }
    });

    ServiceError {
        code: sanitize_error_code(&raw_code).to_string(),
        message,
        status: Some(status),
    }
}

/// Strips the `namespace#` prefix and `:uri` suffix some responses carry.
fn sanitize_error_code(raw: &str) -> &str {
    let code = raw.split(':').next().unwrap_or(raw);
    code.rsplit('#').next().unwrap_or(code).trim()
}
