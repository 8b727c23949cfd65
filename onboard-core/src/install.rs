//! Install-run tracking: per-plugin status, progress totals, and the
//! failed-plugin set, driven by poll responses.

use crate::catalog::Catalog;
use std::collections::{BTreeMap, BTreeSet};

/// Classified install status of one job. The server reports free-text
/// status strings; classification happens exactly once, at the protocol
/// edge, by case-sensitive substring match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Installing,
    Success,
    Failure,
}

impl JobStatus {
    /// Substring classification of a wire status string; `None` when the
    /// string matches none of the known markers.
    pub fn classify(wire: &str) -> Option<JobStatus> {
        if wire.contains("Success") {
            Some(JobStatus::Success)
        } else if wire.contains("Install") {
            Some(JobStatus::Installing)
        } else if wire.contains("Fail") {
            Some(JobStatus::Failure)
        } else {
            None
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failure)
    }

    /// Rank used to keep per-plugin transitions monotonic within a run.
    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Installing => 1,
            JobStatus::Success | JobStatus::Failure => 2,
        }
    }
}

/// One job from a poll response, classified and matched by name (the
/// server does not guarantee a stable job order across polls).
#[derive(Debug, Clone)]
pub struct JobReport {
    pub name: String,
    pub title: Option<String>,
    pub status: Option<JobStatus>,
    /// Jobs carrying a correlation id were selected by the user; the rest
    /// are dependency installs.
    pub selected_by_user: bool,
}

/// One selected plugin tracked through an install run.
#[derive(Debug, Clone)]
pub struct InstallingPlugin {
    pub name: String,
    pub title: String,
    pub status: JobStatus,
    pub all_dependencies: BTreeSet<String>,
}

/// Snapshot of one poll cycle: terminal jobs seen vs. the total to wait
/// for. `total` is the larger of the reported job count and the tracked
/// plugin count, which keeps an empty first response from finishing the
/// run early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub complete: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.complete as f32 / self.total as f32
    }
}

/// Mutable state of one install run. All updates go through
/// [`InstallProgress::apply_jobs`]; nothing here touches the UI.
#[derive(Debug, Clone, Default)]
pub struct InstallProgress {
    installing: Vec<InstallingPlugin>,
    failed: Vec<String>,
    finished: bool,
}

impl InstallProgress {
    /// Seeds pending entries for the selected names. Names the catalog
    /// does not know are skipped.
    pub fn from_selection(catalog: &Catalog, selected: &[String]) -> Self {
        let installing = selected
            .iter()
            .filter_map(|name| {
                catalog.plugin(name).map(|plugin| InstallingPlugin {
                    name: plugin.name.clone(),
                    title: plugin.title.clone(),
                    status: JobStatus::Pending,
                    all_dependencies: catalog.all_dependencies_of(name),
                })
            })
            .collect();
        Self {
            installing,
            failed: Vec::new(),
            finished: false,
        }
    }

    pub fn plugins(&self) -> &[InstallingPlugin] {
        &self.installing
    }

    pub fn get(&self, name: &str) -> Option<&InstallingPlugin> {
        self.installing.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.installing.is_empty()
    }

    pub fn failed_names(&self) -> &[String] {
        &self.failed
    }

    pub fn clear_failed(&mut self) {
        self.failed.clear();
    }

    /// Names still pending, in tracked order. This is the set re-submitted
    /// when resuming an interrupted install.
    pub fn pending_names(&self) -> Vec<String> {
        self.installing
            .iter()
            .filter(|p| p.status == JobStatus::Pending)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Applies one poll batch. Jobs are matched by name; per-plugin status
    /// only ever advances (repeated responses may re-assert a state). A
    /// pending plugin whose dependency closure contains a job that is
    /// installing or succeeded is promoted to installing, so progress shows
    /// even while the server only reports dependency jobs.
    pub fn apply_jobs(&mut self, jobs: &[JobReport]) -> ProgressSnapshot {
        let mut complete = 0;
        for job in jobs {
            let Some(status) = job.status else {
                continue;
            };
            if status.is_terminal() {
                complete += 1;
            }
            self.note_status(&job.name, status);

            if status == JobStatus::Installing || status == JobStatus::Success {
                for plugin in &mut self.installing {
                    if plugin.status == JobStatus::Pending
                        && plugin.all_dependencies.contains(&job.name)
                    {
                        plugin.status = JobStatus::Installing;
                    }
                }
            }
        }

        ProgressSnapshot {
            complete,
            total: jobs.len().max(self.installing.len()),
        }
    }

    /// Records one job status: advances the tracked entry (never backward)
    /// and maintains the failed set. A later non-failure report removes
    /// the name from the failed set again.
    pub fn note_status(&mut self, name: &str, status: JobStatus) {
        if let Some(plugin) = self.installing.iter_mut().find(|p| p.name == name) {
            if status.rank() >= plugin.status.rank() {
                plugin.status = status;
            }
        }
        let failed_idx = self.failed.iter().position(|n| n == name);
        match (status, failed_idx) {
            (JobStatus::Failure, None) => self.failed.push(name.to_string()),
            (JobStatus::Failure, Some(_)) => {}
            (_, Some(idx)) => {
                self.failed.remove(idx);
            }
            (_, None) => {}
        }
    }

    /// Seeds statuses from the incomplete-install listing reported after a
    /// crash or restart. An "Install…" status maps back to pending there:
    /// the job never finished and will be re-submitted.
    pub fn apply_incomplete(&mut self, statuses: &BTreeMap<String, String>) {
        for (name, wire) in statuses {
            let Some(status) = JobStatus::classify(wire) else {
                continue;
            };
            let status = match status {
                JobStatus::Installing => JobStatus::Pending,
                other => other,
            };
            match self.installing.iter_mut().find(|p| p.name == *name) {
                Some(plugin) => plugin.status = status,
                None => {
                    log::warn!("plugin {name} is not in the tracked install list");
                }
            }
        }
    }

    /// Terminal detection, latched so completion is observed exactly once
    /// even when further identical poll responses arrive. `server_installing`
    /// is whether the server still reports the install-in-progress state.
    pub fn complete(&mut self, snapshot: ProgressSnapshot, server_installing: bool) -> bool {
        if self.finished {
            return false;
        }
        if snapshot.complete >= snapshot.total && !server_installing {
            self.finished = true;
            return true;
        }
        false
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
