use inspector_scan::error::{ErrorCode, InspectorError};
use inspector_scan::models::{ListCoverageRequest, ListFindingsRequest, Operation, severity_filter};
use inspector_scan::stubber::{InspectorStubber, canned};
use inspector_scan::wrapper::InspectorWrapper;
use serde_json::json;

fn stubbed_wrapper() -> InspectorWrapper<InspectorStubber> {
    InspectorWrapper::new(InspectorStubber::new())
}

#[tokio::test]
async fn enable_returns_enabling_response() {
    let wrapper = stubbed_wrapper();
    wrapper.client().stub_enable(&["EC2"], &[], None);

    let response = wrapper.enable_inspector(&["EC2"], &[]).await.unwrap();

    assert_eq!(response, canned::enable());
    assert_eq!(response["accounts"][0]["status"], "ENABLING");
    wrapper.client().assert_no_pending();
}

#[tokio::test]
async fn enable_with_account_ids_sends_them() {
    let wrapper = stubbed_wrapper();
    wrapper
        .client()
        .stub_enable(&["EC2", "ECR"], &["111122223333"], None);

    wrapper
        .enable_inspector(&["EC2", "ECR"], &["111122223333"])
        .await
        .unwrap();

    let calls = wrapper.client().calls();
    assert_eq!(
        serde_json::Value::Object(calls[0].params.clone()),
        json!({"resourceTypes": ["EC2", "ECR"], "accountIds": ["111122223333"]})
    );
}

#[tokio::test]
async fn enable_error_is_returned_unchanged() {
    let wrapper = stubbed_wrapper();
    wrapper
        .client()
        .stub_enable(&["EC2"], &[], Some("AccessDeniedException"));

    let err = wrapper.enable_inspector(&["EC2"], &[]).await.unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::AccessDenied));
}

#[tokio::test]
async fn account_status_without_ids_sends_empty_params() {
    let wrapper = stubbed_wrapper();
    wrapper.client().stub_batch_get_account_status(&[], None);

    let response = wrapper.get_account_status(&[]).await.unwrap();

    assert_eq!(response["accounts"][0]["state"]["status"], "ENABLED");
    assert!(wrapper.client().calls()[0].params.is_empty());
}

#[tokio::test]
async fn list_findings_with_filter_and_limit() {
    let wrapper = stubbed_wrapper();
    wrapper.client().stub_list_findings(
        Some(severity_filter("CRITICAL")),
        None,
        Some(10),
        None,
        None,
    );

    let request = ListFindingsRequest::default()
        .with_filter(severity_filter("CRITICAL"))
        .with_max_results(10);
    let response = wrapper.list_findings(&request).await.unwrap();

    assert_eq!(response, canned::list_findings());
    assert_eq!(response["findings"][0]["severity"], "CRITICAL");
}

#[tokio::test]
async fn list_findings_internal_server_error() {
    let wrapper = stubbed_wrapper();
    wrapper
        .client()
        .stub_list_findings(None, None, None, None, Some("InternalServerException"));

    let err = wrapper
        .list_findings(&ListFindingsRequest::default())
        .await
        .unwrap_err();

    let InspectorError::Service(service) = err else {
        panic!("expected a service error");
    };
    assert_eq!(service.code, "InternalServerException");
    wrapper.client().assert_no_pending();
}

#[tokio::test]
async fn list_findings_paginates_with_sort_and_token() {
    let sort = json!({"field": "SEVERITY", "sortOrder": "DESC"});
    let wrapper = stubbed_wrapper();
    wrapper
        .client()
        .stub_list_findings(None, Some(sort.clone()), Some(50), Some("page-2"), None);

    let request = ListFindingsRequest::default()
        .with_sort(sort)
        .with_max_results(50)
        .with_next_token("page-2");
    wrapper.list_findings(&request).await.unwrap();
    wrapper.client().assert_no_pending();
}

#[tokio::test]
async fn finding_details_echo_requested_arn() {
    let arn = "arn:aws:inspector2:us-east-1:123456789012:finding/feedface";
    let wrapper = stubbed_wrapper();
    wrapper.client().stub_batch_get_finding_details(&[arn], None);

    let response = wrapper.get_finding_details(&[arn]).await.unwrap();

    assert_eq!(response["findingDetails"][0]["findingArn"], arn);
    assert_eq!(response["findingDetails"][0]["riskScore"], 85);
}

#[tokio::test]
async fn finding_details_validation_error() {
    let wrapper = stubbed_wrapper();
    wrapper
        .client()
        .stub_batch_get_finding_details(&["bad-arn"], Some("ValidationException"));

    let err = wrapper.get_finding_details(&["bad-arn"]).await.unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::Validation));
}

#[tokio::test]
async fn list_coverage_with_filter() {
    let filter = json!({"resourceType": [{"comparison": "EQUALS", "value": "AWS_EC2_INSTANCE"}]});
    let wrapper = stubbed_wrapper();
    wrapper
        .client()
        .stub_list_coverage(Some(filter.clone()), Some(10), None, None);

    let request = ListCoverageRequest::default()
        .with_filter(filter)
        .with_max_results(10);
    let response = wrapper.list_coverage(&request).await.unwrap();

    assert_eq!(response["coveredResources"][0]["scanType"], "PACKAGE");
}

#[tokio::test]
async fn disable_conflict_is_returned() {
    let wrapper = stubbed_wrapper();
    wrapper
        .client()
        .stub_disable(&["EC2"], &[], Some("ConflictException"));

    let err = wrapper.disable_inspector(&["EC2"], &[]).await.unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::Conflict));
}

#[tokio::test]
async fn full_lifecycle_in_registration_order() {
    let wrapper = stubbed_wrapper();
    let client = wrapper.client();
    client.stub_enable(&["EC2"], &[], None);
    client.stub_batch_get_account_status(&[], None);
    client.stub_list_findings(None, None, None, None, None);
    client.stub_batch_get_finding_details(&[canned::FINDING_ARN], None);
    client.stub_list_coverage(None, None, None, None);
    client.stub_disable(&["EC2"], &[], None);

    wrapper.enable_inspector(&["EC2"], &[]).await.unwrap();
    wrapper.get_account_status(&[]).await.unwrap();
    wrapper
        .list_findings(&ListFindingsRequest::default())
        .await
        .unwrap();
    wrapper
        .get_finding_details(&[canned::FINDING_ARN])
        .await
        .unwrap();
    wrapper
        .list_coverage(&ListCoverageRequest::default())
        .await
        .unwrap();
    let disabled = wrapper.disable_inspector(&["EC2"], &[]).await.unwrap();

    assert_eq!(disabled["accounts"][0]["status"], "DISABLING");
    let operations: Vec<_> = client.calls().iter().map(|c| c.operation).collect();
    assert_eq!(operations, Operation::ALL);
    client.assert_no_pending();
}

#[tokio::test]
#[should_panic(expected = "Parameter mismatch for list_coverage")]
async fn unexpected_optional_parameter_fails_the_test() {
    let wrapper = stubbed_wrapper();
    wrapper.client().stub_list_coverage(None, None, None, None);

    let _ = wrapper
        .list_coverage(&ListCoverageRequest::default().with_max_results(5))
        .await;
}
