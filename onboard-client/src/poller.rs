//! Blocking install-status poll loop at a fixed cadence. Used by the
//! headless path; the GUI schedules the same requests off its own frame
//! clock.

use crate::api::SetupApi;
use crate::http::ClientError;
use onboard_core::install::{InstallProgress, ProgressSnapshot};
use onboard_core::wizard::WizardState;
use std::thread;
use std::time::Duration;

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Polls until every tracked job reaches a terminal state and the server
/// has left the installing state. `on_tick` runs after each response with
/// the latest snapshot. Returns the failed plugin names, empty on a clean
/// run.
pub fn poll_until_complete<F>(
    api: &SetupApi,
    correlation_id: Option<&str>,
    progress: &mut InstallProgress,
    mut on_tick: F,
) -> Result<Vec<String>, ClientError>
where
    F: FnMut(ProgressSnapshot, &InstallProgress),
{
    loop {
        let status = api.install_status(correlation_id)?;
        let jobs: Vec<_> = status.jobs.iter().map(|j| j.to_report()).collect();
        let snapshot = progress.apply_jobs(&jobs);
        on_tick(snapshot, progress);

        let installing =
            WizardState::parse(&status.state) == WizardState::InitialPluginsInstalling;
        if progress.complete(snapshot, installing) {
            return Ok(progress.failed_names().to_vec());
        }
        thread::sleep(POLL_INTERVAL);
    }
}
