use crate::client::InspectorApi;
use crate::error::InspectorError;
use crate::models::{ListCoverageRequest, ListFindingsRequest, count_items, severity_filter};
use crate::wrapper::InspectorWrapper;
use std::io::Write;

const BANNER_WIDTH: usize = 88;
const DEMO_PAGE_SIZE: u32 = 10;

/// Walks through account status, critical findings, and coverage.
///
/// A service error ends the demo with a logged `Demo failed`; transport,
/// credential and write failures are returned.
pub async fn run_demo<C: InspectorApi>(
    wrapper: &InspectorWrapper<C>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let rule = "-".repeat(BANNER_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "Welcome to the Amazon Inspector wrapper demo!")?;
    writeln!(out, "{rule}")?;

    match demo_steps(wrapper, out).await {
        Ok(()) => Ok(()),
        Err(DemoError::Service(err)) => {
            tracing::error!("Demo failed: {err}");
            Ok(())
        }
        Err(DemoError::Fatal(err)) => Err(err),
    }
}

enum DemoError {
    Service(InspectorError),
    Fatal(anyhow::Error),
}

impl From<InspectorError> for DemoError {
    fn from(err: InspectorError) -> Self {
        match err {
            InspectorError::Service(_) => Self::Service(err),
            other => Self::Fatal(other.into()),
        }
    }
}

impl From<std::io::Error> for DemoError {
    fn from(err: std::io::Error) -> Self {
        Self::Fatal(err.into())
    }
}

async fn demo_steps<C: InspectorApi>(
    wrapper: &InspectorWrapper<C>,
    out: &mut impl Write,
) -> Result<(), DemoError> {
    writeln!(out, "Getting account status...")?;
    let status = wrapper.get_account_status(&[]).await?;
    writeln!(out, "Account status: {status}")?;

    writeln!(out, "\nListing critical findings...")?;
    let request = ListFindingsRequest::default()
        .with_filter(severity_filter("CRITICAL"))
        .with_max_results(DEMO_PAGE_SIZE);
    let findings = wrapper.list_findings(&request).await?;
    writeln!(
        out,
        "Found {} critical findings",
        count_items(&findings, "findings")
    )?;

    writeln!(out, "\nListing resource coverage...")?;
    let request = ListCoverageRequest::default().with_max_results(DEMO_PAGE_SIZE);
    let coverage = wrapper.list_coverage(&request).await?;
    writeln!(
        out,
        "Coverage for {} resources",
        count_items(&coverage, "coveredResources")
    )?;
    Ok(())
}
