//! Test double for the inspector2 client.
//!
//! Expectations are queued with the `stub_*` methods and consumed strictly in
//! registration order. A call that does not match the head of the queue, or
//! arrives when the queue is empty, panics and fails the test.
//!
//! ```
//! use inspector_scan::stubber::InspectorStubber;
//! use inspector_scan::wrapper::InspectorWrapper;
//!
//! # tokio_test_block_on(async {
//! let wrapper = InspectorWrapper::new(InspectorStubber::new());
//! wrapper.client().stub_enable(&["EC2"], &[], None);
//!
//! let response = wrapper.enable_inspector(&["EC2"], &[]).await.unwrap();
//! assert_eq!(response["accounts"][0]["status"], "ENABLING");
//! wrapper.client().assert_no_pending();
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use crate::client::InspectorApi;
use crate::error::{InspectorError, ServiceError};
use crate::models::{
    AccountStatusRequest, FindingDetailsRequest, ListCoverageRequest, ListFindingsRequest,
    Operation, Params, ResourceScanRequest, to_params,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// HTTP status attached to simulated errors.
const SIMULATED_ERROR_STATUS: u16 = 400;

/// One queued expectation: the call we expect and what to answer with.
#[derive(Debug, Clone)]
pub struct Expectation {
    pub operation: Operation,
    pub expected_params: Params,
    pub outcome: Result<Value, ServiceError>,
}

/// A call received by the stubber, recorded whether or not it matched.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: Operation,
    pub params: Params,
}

enum Mode {
    Stubbed,
    Passthrough(Box<dyn InspectorApi>),
}

pub struct InspectorStubber {
    mode: Mode,
    expectations: Mutex<VecDeque<Expectation>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl InspectorStubber {
    pub fn new() -> Self {
        Self::with_mode(Mode::Stubbed)
    }

    /// Forwards every call to `client`; `stub_*` registrations are ignored.
    pub fn passthrough(client: impl InspectorApi + 'static) -> Self {
        Self::with_mode(Mode::Passthrough(Box::new(client)))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            expectations: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn is_stubbing(&self) -> bool {
        matches!(self.mode, Mode::Stubbed)
    }

    /// Queues either `response` or, when `error_code` is set, a simulated
    /// service error carrying that code.
    pub fn stub_bifurcator(
        &self,
        operation: Operation,
        expected_params: Params,
        response: Value,
        error_code: Option<&str>,
    ) {
        if !self.is_stubbing() {
            return;
        }
        let outcome = match error_code {
            Some(code) => Err(ServiceError {
                code: code.to_string(),
                message: String::new(),
                status: Some(SIMULATED_ERROR_STATUS),
            }),
            None => Ok(response),
        };
        lock(&self.expectations).push_back(Expectation {
            operation,
            expected_params,
            outcome,
        });
    }

    pub fn stub_enable(
        &self,
        resource_types: &[&str],
        account_ids: &[&str],
        error_code: Option<&str>,
    ) {
        let params = expected(&ResourceScanRequest {
            resource_types: owned(resource_types),
            account_ids: owned(account_ids),
        });
        self.stub_bifurcator(Operation::Enable, params, canned::enable(), error_code);
    }

    pub fn stub_batch_get_account_status(&self, account_ids: &[&str], error_code: Option<&str>) {
        let params = expected(&AccountStatusRequest {
            account_ids: owned(account_ids),
        });
        self.stub_bifurcator(
            Operation::BatchGetAccountStatus,
            params,
            canned::batch_get_account_status(),
            error_code,
        );
    }

    pub fn stub_list_findings(
        &self,
        filter_criteria: Option<Value>,
        sort_criteria: Option<Value>,
        max_results: Option<u32>,
        next_token: Option<&str>,
        error_code: Option<&str>,
    ) {
        let params = expected(&ListFindingsRequest {
            filter_criteria,
            sort_criteria,
            max_results,
            next_token: next_token.map(str::to_string),
        });
        self.stub_bifurcator(
            Operation::ListFindings,
            params,
            canned::list_findings(),
            error_code,
        );
    }

    pub fn stub_batch_get_finding_details(&self, finding_arns: &[&str], error_code: Option<&str>) {
        let params = expected(&FindingDetailsRequest {
            finding_arns: owned(finding_arns),
        });
        let response = canned::batch_get_finding_details(finding_arns.first().copied());
        self.stub_bifurcator(
            Operation::BatchGetFindingDetails,
            params,
            response,
            error_code,
        );
    }

    pub fn stub_list_coverage(
        &self,
        filter_criteria: Option<Value>,
        max_results: Option<u32>,
        next_token: Option<&str>,
        error_code: Option<&str>,
    ) {
        let params = expected(&ListCoverageRequest {
            filter_criteria,
            max_results,
            next_token: next_token.map(str::to_string),
        });
        self.stub_bifurcator(
            Operation::ListCoverage,
            params,
            canned::list_coverage(),
            error_code,
        );
    }

    pub fn stub_disable(
        &self,
        resource_types: &[&str],
        account_ids: &[&str],
        error_code: Option<&str>,
    ) {
        let params = expected(&ResourceScanRequest {
            resource_types: owned(resource_types),
            account_ids: owned(account_ids),
        });
        self.stub_bifurcator(Operation::Disable, params, canned::disable(), error_code);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of expectations not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.expectations).len()
    }

    pub fn assert_no_pending(&self) {
        let remaining: Vec<String> = lock(&self.expectations)
            .iter()
            .map(|e| e.operation.to_string())
            .collect();
        assert!(
            remaining.is_empty(),
            "{} stubbed call(s) never made: {}",
            remaining.len(),
            remaining.join(", ")
        );
    }

    fn next_expectation(&self, operation: Operation, params: &Params) -> Expectation {
        let Some(expectation) = lock(&self.expectations).pop_front() else {
            panic!(
                "Unexpected call to {operation}: no stubbed responses remain\n  params: {}",
                render(params)
            );
        };
        if expectation.operation != operation {
            panic!(
                "Operation mismatch: expected a call to {}, got {operation}\n  params: {}",
                expectation.operation,
                render(params)
            );
        }
        if expectation.expected_params != *params {
            panic!(
                "Parameter mismatch for {operation}\n  expected: {}\n  actual:   {}",
                render(&expectation.expected_params),
                render(params)
            );
        }
        expectation
    }
}

impl Default for InspectorStubber {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InspectorStubber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectorStubber")
            .field("stubbing", &self.is_stubbing())
            .field("pending", &self.pending())
            .field("calls", &lock(&self.calls).len())
            .finish()
    }
}

#[async_trait]
impl InspectorApi for InspectorStubber {
    async fn call(&self, operation: Operation, params: Params) -> Result<Value, InspectorError> {
        lock(&self.calls).push(RecordedCall {
            operation,
            params: params.clone(),
        });

        if let Mode::Passthrough(ref client) = self.mode {
            return client.call(operation, params).await;
        }

        let expectation = self.next_expectation(operation, &params);
        tracing::trace!(%operation, "Returning stubbed outcome");
        expectation.outcome.map_err(InspectorError::Service)
    }
}

/// Poisoning only happens after a failed assertion, which already failed the test.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn expected<T: Serialize>(request: &T) -> Params {
    to_params(request).unwrap_or_else(|e| panic!("stub parameters must form a JSON object: {e}"))
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn render(params: &Params) -> String {
    serde_json::to_string(params).unwrap_or_else(|_| format!("{params:?}"))
}

/// Canned responses returned by the `stub_*` helpers.
pub mod canned {
    use serde_json::{Value, json};

    pub const ACCOUNT_ID: &str = "123456789012";
    pub const FINDING_ARN: &str =
        "arn:aws:inspector2:us-east-1:123456789012:finding/0123456789abcdef0123456789abcdef";
    pub const INSTANCE_ID: &str = "i-1234567890abcdef0";

    pub fn enable() -> Value {
        json!({
            "accounts": [{
                "accountId": ACCOUNT_ID,
                "status": "ENABLING",
                "resourceStatus": {"ec2": "ENABLING"}
            }]
        })
    }

    pub fn batch_get_account_status() -> Value {
        json!({
            "accounts": [{
                "accountId": ACCOUNT_ID,
                "state": {"status": "ENABLED"},
                "resourceState": {
                    "ec2": {"status": "ENABLED"},
                    "ecr": {"status": "ENABLED"}
                }
            }]
        })
    }

    pub fn list_findings() -> Value {
        json!({
            "findings": [{
                "findingArn": FINDING_ARN,
                "awsAccountId": ACCOUNT_ID,
                "type": "PACKAGE_VULNERABILITY",
                "description": "CVE-2023-1234 - Critical vulnerability in package",
                "severity": "CRITICAL",
                "firstObservedAt": "2023-01-01T00:00:00.000Z",
                "lastObservedAt": "2023-01-01T00:00:00.000Z",
                "updatedAt": "2023-01-01T00:00:00.000Z",
                "status": "ACTIVE",
                "remediation": {
                    "recommendation": {"text": "Update the package to the latest version"}
                },
                "resources": [{"id": INSTANCE_ID, "type": "AWS_EC2_INSTANCE"}],
                "packageVulnerabilityDetails": {
                    "source": "NVD",
                    "vulnerabilityId": "CVE-2023-1234",
                    "vulnerablePackages": [{
                        "name": "example-package",
                        "version": "1.0.0",
                        "sourceLayerHash": "sha256:1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef12"
                    }],
                    "cvss": [{
                        "version": "3.1",
                        "baseScore": 9.8,
                        "scoringVector": "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H",
                        "source": "NVD"
                    }]
                }
            }]
        })
    }

    /// Details for `finding_arn`, or for [`FINDING_ARN`] when none was requested.
    pub fn batch_get_finding_details(finding_arn: Option<&str>) -> Value {
        json!({
            "findingDetails": [{
                "findingArn": finding_arn.unwrap_or(FINDING_ARN),
                "cisaData": {
                    "action": "Apply updates per vendor instructions",
                    "dateAdded": "2023-01-01T00:00:00.000Z"
                },
                "riskScore": 85,
                "tools": ["INSPECTOR"],
                "ttps": ["T1190"]
            }]
        })
    }

    pub fn list_coverage() -> Value {
        json!({
            "coveredResources": [{
                "resourceId": INSTANCE_ID,
                "resourceType": "AWS_EC2_INSTANCE",
                "accountId": ACCOUNT_ID,
                "scanType": "PACKAGE",
                "scanStatus": {"statusCode": "ACTIVE", "reason": "SUCCESSFUL"}
            }]
        })
    }

    pub fn disable() -> Value {
        json!({
            "accounts": [{
                "accountId": ACCOUNT_ID,
                "status": "DISABLING",
                "resourceStatus": {"ec2": "DISABLING"}
            }]
        })
    }
}
