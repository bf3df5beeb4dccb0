use async_trait::async_trait;
use eventdex_core::{ProgressReport, SessionSummary};
use eventdex_logging::dex_info;
use tokio::sync::mpsc;

use crate::ReportError;

/// Renders running counters. Failures are logged by the caller and never abort tracking.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn render(&self, report: &ProgressReport) -> Result<(), ReportError>;

    async fn finish(&self, summary: &SessionSummary) -> Result<(), ReportError>;
}

/// Writes progress to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

#[async_trait]
impl ProgressReporter for LogReporter {
    async fn render(&self, report: &ProgressReport) -> Result<(), ReportError> {
        dex_info!(
            "progress: tracked={} added={} inventory={} duplicates={}",
            report.tracked,
            report.added,
            report.inventory_total,
            report.duplicates_ignored
        );
        Ok(())
    }

    async fn finish(&self, summary: &SessionSummary) -> Result<(), ReportError> {
        dex_info!("session finished ({}): {:?}", summary.outcome, summary.report);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReporterEvent {
    Progress(ProgressReport),
    Finished(SessionSummary),
}

/// Forwards every rendering to a channel, e.g. to a status message owner.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ReporterEvent>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReporterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ReporterEvent) -> Result<(), ReportError> {
        self.tx
            .send(event)
            .map_err(|_| ReportError("status receiver dropped".into()))
    }
}

#[async_trait]
impl ProgressReporter for ChannelReporter {
    async fn render(&self, report: &ProgressReport) -> Result<(), ReportError> {
        self.send(ReporterEvent::Progress(report.clone()))
    }

    async fn finish(&self, summary: &SessionSummary) -> Result<(), ReportError> {
        self.send(ReporterEvent::Finished(summary.clone()))
    }
}
