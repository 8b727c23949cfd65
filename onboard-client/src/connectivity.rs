//! Connectivity check against the update site. Indeterminate answers are
//! re-polled at a short interval until the server has finished checking.

use crate::api::SetupApi;
use crate::http::ClientError;
use crate::protocol::{CheckStatus, ConnectionStatusData};
use std::thread;
use std::time::Duration;

const RECHECK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Online,
    Offline { fatal: bool },
    /// The server has not finished checking yet; ask again.
    Recheck,
}

/// Classifies one connectivity response. The update site must be OK;
/// SKIPPED is acceptable for general internet reachability only.
pub fn classify(status: &ConnectionStatusData) -> Decision {
    let values = [status.updatesite, status.internet];
    if values.contains(&CheckStatus::Error) {
        return Decision::Offline { fatal: true };
    }
    if values.iter().any(|v| {
        matches!(
            v,
            CheckStatus::Precheck | CheckStatus::Checking | CheckStatus::Unchecked
        )
    }) {
        return Decision::Recheck;
    }
    let internet_ok = matches!(status.internet, CheckStatus::Ok | CheckStatus::Skipped);
    if status.updatesite == CheckStatus::Ok && internet_ok {
        Decision::Online
    } else {
        Decision::Offline { fatal: false }
    }
}

/// Blocks until the server reports a settled connectivity state.
pub fn check(api: &SetupApi, site_id: &str) -> Result<Decision, ClientError> {
    loop {
        let status = api.connection_status(site_id)?;
        match classify(&status) {
            Decision::Recheck => {
                log::debug!(
                    "connectivity still settling (updatesite {:?}, internet {:?})",
                    status.updatesite,
                    status.internet
                );
                thread::sleep(RECHECK_INTERVAL);
            }
            decision => return Ok(decision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(updatesite: CheckStatus, internet: CheckStatus) -> ConnectionStatusData {
        ConnectionStatusData { updatesite, internet }
    }

    #[test]
    fn ok_with_skipped_internet_is_online() {
        assert_eq!(
            classify(&status(CheckStatus::Ok, CheckStatus::Skipped)),
            Decision::Online
        );
    }

    #[test]
    fn skipped_update_site_is_not_online() {
        assert_eq!(
            classify(&status(CheckStatus::Skipped, CheckStatus::Ok)),
            Decision::Offline { fatal: false }
        );
    }

    #[test]
    fn unsettled_values_ask_for_recheck() {
        for pending in [CheckStatus::Precheck, CheckStatus::Checking, CheckStatus::Unchecked] {
            assert_eq!(
                classify(&status(pending, CheckStatus::Ok)),
                Decision::Recheck
            );
        }
    }

    #[test]
    fn any_error_is_fatal_offline() {
        assert_eq!(
            classify(&status(CheckStatus::Error, CheckStatus::Checking)),
            Decision::Offline { fatal: true }
        );
    }
}
