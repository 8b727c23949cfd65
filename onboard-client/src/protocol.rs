//! Wire types for the setup endpoints. Every payload arrives wrapped in
//! an envelope whose `status` field decides success independently of the
//! HTTP status code.

use crate::http::ClientError;
use onboard_core::install::{JobReport, JobStatus};
use serde::Deserialize;
use std::collections::BTreeMap;

/// `{status, message?, data?}` wrapper common to all endpoints. The
/// observed status literals are "ok", "error" and "fail"; anything other
/// than "ok" is a failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T, ClientError> {
        if self.status != "ok" {
            return Err(ClientError::Api {
                message: self.message.unwrap_or_default(),
            });
        }
        self.data.ok_or_else(|| {
            ClientError::Malformed("response envelope carries no data".to_string())
        })
    }

    /// For endpoints whose payload is irrelevant; only checks the status.
    pub fn ack(self) -> Result<(), ClientError> {
        if self.status != "ok" {
            return Err(ClientError::Api {
                message: self.message.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// One job from the install-status poll. `install_status` is free text
/// on the wire; classification happens here, once, via substring match.
#[derive(Debug, Clone, Deserialize)]
pub struct JobData {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "installStatus")]
    pub install_status: String,
    #[serde(rename = "correlationId", default)]
    pub correlation_id: Option<String>,
}

impl JobData {
    pub fn to_report(&self) -> JobReport {
        JobReport {
            name: self.name.clone(),
            title: self.title.clone(),
            status: JobStatus::classify(&self.install_status),
            selected_by_user: self.correlation_id.is_some(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallStatusData {
    pub state: String,
    #[serde(default)]
    pub jobs: Vec<JobData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallData {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
}

pub type IncompleteStatusData = BTreeMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct RestartStatusData {
    #[serde(rename = "restartRequired")]
    pub restart_required: bool,
    #[serde(rename = "restartSupported")]
    pub restart_supported: bool,
}

/// Connectivity check values for the update site and general internet
/// reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Ok,
    Skipped,
    Precheck,
    Checking,
    Unchecked,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionStatusData {
    pub updatesite: CheckStatus,
    pub internet: CheckStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfoData {
    #[serde(rename = "rootUrl", default)]
    pub root_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_rejects_every_non_ok_status() {
        for status in ["error", "fail", "weird"] {
            let envelope: Envelope<InstallData> = serde_json::from_str(&format!(
                r#"{{"status": "{status}", "message": "boom"}}"#
            ))
            .unwrap();
            assert!(envelope.into_result().is_err());
        }
    }

    #[test]
    fn job_classification_happens_at_the_edge() {
        let job: JobData = serde_json::from_str(
            r#"{"name": "git", "installStatus": "InstallingPlugin", "correlationId": "abc"}"#,
        )
        .unwrap();
        let report = job.to_report();
        assert_eq!(report.status, Some(JobStatus::Installing));
        assert!(report.selected_by_user);
    }

    #[test]
    fn unknown_check_status_parses_as_unknown() {
        let data: ConnectionStatusData = serde_json::from_str(
            r#"{"updatesite": "NEW_VALUE", "internet": "OK"}"#,
        )
        .unwrap();
        assert_eq!(data.updatesite, CheckStatus::Unknown);
        assert_eq!(data.internet, CheckStatus::Ok);
    }
}
