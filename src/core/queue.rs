//! Sequential driver for queued download requests.

use std::path::Path;
use tokio::sync::mpsc;

use crate::core::config::Config;
use crate::core::job::{DownloadJob, DownloadRequest, JobReport};
use crate::error::Result;

/// Run queued requests strictly one at a time, in submission order.
///
/// A request that fails to build or run is reported in its slot and the
/// queue moves on to the next one; the caller decides what to surface.
pub async fn run_queue(
    requests: Vec<DownloadRequest>,
    program: &Path,
    config: &Config,
    sink: &mpsc::UnboundedSender<String>,
) -> Vec<Result<JobReport>> {
    let mut reports = Vec::with_capacity(requests.len());

    for request in requests {
        let query = request.query.clone();
        let report = match DownloadJob::build(request, config) {
            Ok(job) => job.run(program, sink.clone()).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &report {
            log::error!("Download job for {:?} failed: {}", query, e);
        }
        reports.push(report);
    }

    reports
}
