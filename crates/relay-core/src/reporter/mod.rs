use async_trait::async_trait;
use relay_model::{CancelReason, Metadata, OutcomeReport};

use crate::error::ReportError;

/// Delivers the final outcome of a task to the controller.
///
/// A session calls into its reporter at most once. Implementations make a single
/// attempt; retrying is not their concern.
#[async_trait]
pub trait Reporter: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn submit(&self, report: &OutcomeReport) -> Result<(), ReportError>;

    async fn report_done(
        &self,
        metadata: Metadata,
        file_names: Vec<String>,
    ) -> Result<(), ReportError> {
        self.submit(&OutcomeReport::done(metadata, file_names)).await
    }

    async fn report_cancel(
        &self,
        metadata: Metadata,
        reason: CancelReason,
    ) -> Result<(), ReportError> {
        self.submit(&OutcomeReport::cancel(metadata, reason)).await
    }
}
