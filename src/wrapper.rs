use crate::client::{HttpInspectorClient, InspectorApi};
use crate::config::{Config, Credentials};
use crate::error::{ErrorCode, InspectorError};
use crate::models::{
    AccountStatusRequest, FindingDetailsRequest, ListCoverageRequest, ListFindingsRequest,
    Operation, ResourceScanRequest, count_items, to_params,
};
use serde::Serialize;
use serde_json::Value;

/// Encapsulates Amazon Inspector functionality over any [`InspectorApi`].
pub struct InspectorWrapper<C> {
    client: C,
}

impl InspectorWrapper<HttpInspectorClient> {
    /// Builds a wrapper over the real service using environment credentials.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let credentials = Credentials::from_env()?;
        Ok(Self::new(HttpInspectorClient::new(config, credentials)?))
    }
}

impl<C: InspectorApi> InspectorWrapper<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Enables scanning for `resource_types` (e.g. `EC2`, `ECR`, `LAMBDA`).
    pub async fn enable_inspector(
        &self,
        resource_types: &[&str],
        account_ids: &[&str],
    ) -> Result<Value, InspectorError> {
        let request = ResourceScanRequest {
            resource_types: owned(resource_types),
            account_ids: owned(account_ids),
        };
        let response = self.send(Operation::Enable, &request).await?;
        tracing::info!(
            resource_types = ?request.resource_types,
            "Successfully enabled Inspector"
        );
        Ok(response)
    }

    /// Account status for `account_ids`, or for the calling account when empty.
    pub async fn get_account_status(&self, account_ids: &[&str]) -> Result<Value, InspectorError> {
        let request = AccountStatusRequest {
            account_ids: owned(account_ids),
        };
        let response = self
            .send(Operation::BatchGetAccountStatus, &request)
            .await?;
        tracing::info!("Successfully retrieved account status");
        Ok(response)
    }

    pub async fn list_findings(
        &self,
        request: &ListFindingsRequest,
    ) -> Result<Value, InspectorError> {
        let response = self.send(Operation::ListFindings, request).await?;
        let count = count_items(&response, "findings");
        tracing::info!(count, "Successfully retrieved {count} findings");
        Ok(response)
    }

    pub async fn get_finding_details(
        &self,
        finding_arns: &[&str],
    ) -> Result<Value, InspectorError> {
        let request = FindingDetailsRequest {
            finding_arns: owned(finding_arns),
        };
        let response = self
            .send(Operation::BatchGetFindingDetails, &request)
            .await?;
        let count = finding_arns.len();
        tracing::info!(count, "Successfully retrieved details for {count} findings");
        Ok(response)
    }

    pub async fn list_coverage(
        &self,
        request: &ListCoverageRequest,
    ) -> Result<Value, InspectorError> {
        let response = self.send(Operation::ListCoverage, request).await?;
        let count = count_items(&response, "coveredResources");
        tracing::info!(count, "Successfully retrieved coverage for {count} resources");
        Ok(response)
    }

    pub async fn disable_inspector(
        &self,
        resource_types: &[&str],
        account_ids: &[&str],
    ) -> Result<Value, InspectorError> {
        let request = ResourceScanRequest {
            resource_types: owned(resource_types),
            account_ids: owned(account_ids),
        };
        let response = self.send(Operation::Disable, &request).await?;
        tracing::info!(
            resource_types = ?request.resource_types,
            "Successfully disabled Inspector"
        );
        Ok(response)
    }

    /// Forwards the call; on failure logs a hint and hands the error back untouched.
    async fn send<T: Serialize>(
        &self,
        operation: Operation,
        request: &T,
    ) -> Result<Value, InspectorError> {
        let params = to_params(request)?;
        match self.client.call(operation, params).await {
            Ok(response) => Ok(response),
            Err(err) => {
                log_failure(operation, &err);
                Err(err)
            }
        }
    }
}

fn log_failure(operation: Operation, err: &InspectorError) {
    if let Some(code) = err.code()
        && let Some(hint) = error_hint(operation, &code)
    {
        tracing::error!(%operation, %code, "{hint}");
    } else {
        tracing::error!(%operation, "Error {}: {err}", action(operation));
    }
}

/// Human-readable hint for the error codes each operation commonly hits.
pub fn error_hint(operation: Operation, code: &ErrorCode) -> Option<&'static str> {
    use ErrorCode::{AccessDenied, Conflict, InternalServer, Validation};
    use Operation::{
        BatchGetAccountStatus, BatchGetFindingDetails, Disable, Enable, ListCoverage,
        ListFindings,
    };

    match (operation, code) {
        (Enable, Validation) => Some("Invalid resource types or account permissions"),
        (Enable, AccessDenied) => Some("Insufficient permissions to enable Inspector"),
        (BatchGetAccountStatus, Validation) => Some("Invalid account IDs format"),
        (BatchGetAccountStatus, AccessDenied) => Some("Access denied for account status"),
        (ListFindings, Validation) => Some("Invalid filter criteria or pagination parameters"),
        (ListFindings, InternalServer) => Some("Internal server error, retrying may help"),
        (BatchGetFindingDetails, Validation) => Some("Invalid finding ARNs format"),
        (BatchGetFindingDetails, AccessDenied) => Some("Access denied for specific findings"),
        (ListCoverage, Validation) => Some("Invalid filter or pagination parameters"),
        (Disable, Validation) => Some("Invalid resource types for disabling"),
        (Disable, Conflict) => Some("Inspector cannot be disabled due to conflicts"),
        _ => None,
    }
}

fn action(operation: Operation) -> &'static str {
    match operation {
        Operation::Enable => "enabling Inspector",
        Operation::BatchGetAccountStatus => "getting account status",
        Operation::ListFindings => "listing findings",
        Operation::BatchGetFindingDetails => "getting finding details",
        Operation::ListCoverage => "listing coverage",
        Operation::Disable => "disabling Inspector",
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
