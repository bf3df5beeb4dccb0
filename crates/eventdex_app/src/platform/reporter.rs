use std::fmt::Display;
use std::io::Write;

use async_trait::async_trait;
use eventdex_core::{ProgressReport, SessionSummary};
use eventdex_engine::{ProgressReporter, ReportError};

/// Prints progress blocks to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StdoutReporter;

fn print_block(body: &dyn Display) -> Result<(), ReportError> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{body}\n")
        .and_then(|_| out.flush())
        .map_err(|err| ReportError(err.to_string()))
}

#[async_trait]
impl ProgressReporter for StdoutReporter {
    async fn render(&self, report: &ProgressReport) -> Result<(), ReportError> {
        print_block(report)
    }

    async fn finish(&self, summary: &SessionSummary) -> Result<(), ReportError> {
        print_block(summary)
    }
}
