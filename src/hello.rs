use crate::client::InspectorApi;
use crate::error::{ErrorCode, InspectorError};
use crate::models::AccountStatusResponse;
use crate::wrapper::InspectorWrapper;
use std::io::Write;

/// Checks the account's Inspector status and prints a short report.
///
/// Service errors are reported to `out` rather than returned; only write
/// failures surface as `Err`.
pub async fn run_hello<C: InspectorApi>(
    wrapper: &InspectorWrapper<C>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out, "Hello, Amazon Inspector! Let's check your account status.")?;

    let response = match wrapper.get_account_status(&[]).await {
        Ok(response) => response,
        Err(err) => return report_error(&err, out),
    };

    let status: AccountStatusResponse = match serde_json::from_value(response) {
        Ok(status) => status,
        Err(e) => {
            writeln!(out, "Unexpected error: {e}")?;
            return Ok(());
        }
    };

    write_account_status(&status, out)
}

fn report_error(err: &InspectorError, out: &mut impl Write) -> std::io::Result<()> {
    match err.code() {
        Some(ErrorCode::AccessDenied) => writeln!(
            out,
            "Access denied. Please ensure you have the necessary permissions for Amazon Inspector."
        ),
        Some(_) => writeln!(out, "Error checking Inspector status: {err}"),
        None => writeln!(out, "Unexpected error: {err}"),
    }
}

fn write_account_status(
    status: &AccountStatusResponse,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let Some(account) = status.accounts.first() else {
        return writeln!(out, "No account information available.");
    };

    let account_id = account.account_id.as_deref().unwrap_or("Unknown");
    let overall = account
        .state
        .as_ref()
        .and_then(|s| s.status.as_deref())
        .unwrap_or("Unknown");
    writeln!(out, "Account ID: {account_id}")?;
    writeln!(out, "Inspector Status: {overall}")?;

    if !account.resource_state.is_empty() {
        writeln!(out, "\nResource Status:")?;
        for (resource_type, status) in account.resource_statuses() {
            let resource_status = status.unwrap_or("Unknown");
            writeln!(out, "  {}: {resource_status}", resource_type.to_uppercase())?;
        }
    }

    writeln!(out, "\nInspector is available in this region and can scan:")?;
    writeln!(out, "  - EC2 instances for software vulnerabilities")?;
    writeln!(out, "  - ECR container images for vulnerabilities")?;
    writeln!(out, "  - Lambda functions for code vulnerabilities")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stubber::InspectorStubber;

    async fn hello_output(stubber: InspectorStubber) -> String {
        let wrapper = InspectorWrapper::new(stubber);
        let mut out = Vec::new();
        run_hello(&wrapper, &mut out).await.unwrap();
        wrapper.client().assert_no_pending();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn prints_account_and_resource_status() {
        let stubber = InspectorStubber::new();
        stubber.stub_batch_get_account_status(&[], None);

        let output = hello_output(stubber).await;
        assert!(output.starts_with("Hello, Amazon Inspector!"));
        assert!(output.contains("Account ID: 123456789012"));
        assert!(output.contains("Inspector Status: ENABLED"));
        assert!(output.contains("Resource Status:\n  EC2: ENABLED\n  ECR: ENABLED"));
        assert!(output.contains("Lambda functions for code vulnerabilities"));
    }

    #[tokio::test]
    async fn access_denied_prints_permissions_hint() {
        let stubber = InspectorStubber::new();
        stubber.stub_batch_get_account_status(&[], Some("AccessDeniedException"));

        let output = hello_output(stubber).await;
        assert!(output.contains("Access denied. Please ensure you have the necessary permissions"));
        assert!(!output.contains("Account ID"));
    }

    #[tokio::test]
    async fn other_service_errors_are_reported() {
        let stubber = InspectorStubber::new();
        stubber.stub_batch_get_account_status(&[], Some("InternalServerException"));

        let output = hello_output(stubber).await;
        assert!(output.contains("Error checking Inspector status: Service error (InternalServerException)"));
    }

    #[test]
    fn resource_types_print_in_response_order() {
        let status: AccountStatusResponse = serde_json::from_value(serde_json::json!({
            "accounts": [{
                "accountId": "123456789012",
                "resourceState": {"lambda": {"status": "ENABLED"}, "ec2": {}}
            }]
        }))
        .unwrap();
        let mut out = Vec::new();
        write_account_status(&status, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Resource Status:\n  LAMBDA: ENABLED\n  EC2: Unknown\n"));
    }

    #[test]
    fn empty_accounts_list_reports_no_information() {
        let mut out = Vec::new();
        write_account_status(&AccountStatusResponse::default(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "No account information available.\n"
        );
    }

    #[test]
    fn missing_fields_print_unknown() {
        let status: AccountStatusResponse =
            serde_json::from_value(serde_json::json!({"accounts": [{}]})).unwrap();
        let mut out = Vec::new();
        write_account_status(&status, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Account ID: Unknown"));
        assert!(output.contains("Inspector Status: Unknown"));
        assert!(!output.contains("Resource Status"));
    }
}
