use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Request parameters as sent on the wire: camelCase keys, absent optionals omitted.
pub type Params = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Enable,
    BatchGetAccountStatus,
    ListFindings,
    BatchGetFindingDetails,
    ListCoverage,
    Disable,
}

impl Operation {
    pub const ALL: [Self; 6] = [
        Self::Enable,
        Self::BatchGetAccountStatus,
        Self::ListFindings,
        Self::BatchGetFindingDetails,
        Self::ListCoverage,
        Self::Disable,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::BatchGetAccountStatus => "batch_get_account_status",
            Self::ListFindings => "list_findings",
            Self::BatchGetFindingDetails => "batch_get_finding_details",
            Self::ListCoverage => "list_coverage",
            Self::Disable => "disable",
        }
    }

    /// REST path of the operation; every inspector2 call here is a JSON `POST`.
    pub const fn http_path(self) -> &'static str {
        match self {
            Self::Enable => "/enable",
            Self::BatchGetAccountStatus => "/status/batch/get",
            Self::ListFindings => "/findings/list",
            Self::BatchGetFindingDetails => "/findings/details/batch/get",
            Self::ListCoverage => "/coverage/list",
            Self::Disable => "/disable",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializes a request struct into wire params.
pub fn to_params<T: Serialize>(request: &T) -> Result<Params, serde_json::Error> {
    match serde_json::to_value(request)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "request must serialize to an object, got {other}"
        ))),
    }
}

// Optional request fields are only sent when they carry a value: zero,
// empty strings and empty containers count as absent.
fn is_blank_value(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn is_unset_count(value: &Option<u32>) -> bool {
    matches!(value, None | Some(0))
}

fn is_blank_token(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// Body of `enable` and `disable`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceScanRequest {
    pub resource_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub account_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub account_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFindingsRequest {
    #[serde(skip_serializing_if = "is_blank_value")]
    pub filter_criteria: Option<Value>,
    #[serde(skip_serializing_if = "is_blank_value")]
    pub sort_criteria: Option<Value>,
    #[serde(skip_serializing_if = "is_unset_count")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "is_blank_token")]
    pub next_token: Option<String>,
}

impl ListFindingsRequest {
    pub fn with_filter(mut self, filter_criteria: Value) -> Self {
        self.filter_criteria = Some(filter_criteria);
        self
    }

    pub fn with_sort(mut self, sort_criteria: Value) -> Self {
        self.sort_criteria = Some(sort_criteria);
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_next_token(mut self, next_token: impl Into<String>) -> Self {
        self.next_token = Some(next_token.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingDetailsRequest {
    pub finding_arns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoverageRequest {
    #[serde(skip_serializing_if = "is_blank_value")]
    pub filter_criteria: Option<Value>,
    #[serde(skip_serializing_if = "is_unset_count")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "is_blank_token")]
    pub next_token: Option<String>,
}

impl ListCoverageRequest {
    pub fn with_filter(mut self, filter_criteria: Value) -> Self {
        self.filter_criteria = Some(filter_criteria);
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_next_token(mut self, next_token: impl Into<String>) -> Self {
        self.next_token = Some(next_token.into());
        self
    }
}

/// Filter criteria matching findings of a single severity.
pub fn severity_filter(severity: &str) -> Value {
    serde_json::json!({
        "severity": [{"comparison": "EQUALS", "value": severity}]
    })
}

/// Number of entries in the array at `key` of a response, 0 if absent.
pub fn count_items(response: &Value, key: &str) -> usize {
    response
        .get(key)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// Typed view of a `batch_get_account_status` response.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusResponse {
    #[serde(default)]
    pub accounts: Vec<AccountState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    pub account_id: Option<String>,
    #[serde(default)]
    pub state: Option<ScanState>,
    #[serde(default)]
    pub resource_state: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanState {
    pub status: Option<String>,
}

impl AccountState {
    /// Per-resource scan status in response order; `None` when a state has no status.
    pub fn resource_statuses(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.resource_state.iter().map(|(resource_type, state)| {
            let status = state.get("status").and_then(Value::as_str);
            (resource_type.as_str(), status)
        })
    }
}
