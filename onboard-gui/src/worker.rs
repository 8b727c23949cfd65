//! Background API thread. The UI thread never blocks on the network: it
//! sends requests down a channel and picks the resulting events up with
//! `try_recv` on each frame.

use onboard_client::api::{FormOutcome, SetupApi, DEFAULT_UPDATE_SITE, TRANSLATION_BUNDLE};
use onboard_client::connectivity::{self, Decision};
use onboard_client::http::{ClientError, HttpClient};
use onboard_core::wizard::{Event, FormKind, WizardState};
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// One request per wizard command that needs the server.
#[derive(Debug, Clone)]
pub enum ApiRequest {
    LoadTranslations,
    CheckConnectivity,
    InstallStatus { correlation_id: Option<String> },
    PollTick { correlation_id: Option<String> },
    IncompleteStatus { correlation_id: Option<String> },
    LoadCatalog,
    Install(Vec<String>),
    RestartStatus,
    CompleteInstall,
    InstallPluginsDone,
    SafeRestart,
    Ping,
    ServerUrl,
    CreateAdminUser(BTreeMap<String, String>),
    ConfigureInstance(BTreeMap<String, String>),
}

pub fn spawn_worker(base_url: &str) -> (Sender<ApiRequest>, Receiver<Event>) {
    let (request_tx, request_rx) = mpsc::channel::<ApiRequest>();
    let (event_tx, event_rx) = mpsc::channel::<Event>();
    let api = SetupApi::new(HttpClient::new(base_url));

    thread::spawn(move || {
        while let Ok(request) = request_rx.recv() {
            let event = execute(&api, request);
            if event_tx.send(event).is_err() {
                break;
            }
        }
    });

    (request_tx, event_rx)
}

fn execute(api: &SetupApi, request: ApiRequest) -> Event {
    match request {
        ApiRequest::LoadTranslations => match api.load_translations(TRANSLATION_BUNDLE) {
            Ok(map) => Event::TranslationsLoaded(map),
            Err(e) => {
                // Missing translations are not worth an error panel.
                log::warn!("translation bundle unavailable: {e}");
                Event::TranslationsLoaded(Default::default())
            }
        },
        ApiRequest::CheckConnectivity => match connectivity::check(api, DEFAULT_UPDATE_SITE) {
            Ok(Decision::Online) => Event::Connectivity {
                online: true,
                fatal: false,
            },
            Ok(Decision::Offline { fatal }) => Event::Connectivity {
                online: false,
                fatal,
            },
            Ok(Decision::Recheck) => {
                // check() resolves rechecks internally; never settle on one.
                log::warn!("connectivity check returned an unsettled decision");
                Event::Connectivity {
                    online: false,
                    fatal: false,
                }
            }
            Err(e) => api_error(e),
        },
        ApiRequest::InstallStatus { correlation_id } => {
            match api.install_status(correlation_id.as_deref()) {
                Ok(status) => Event::InstallStatus {
                    state: WizardState::parse(&status.state),
                    jobs: status.jobs.iter().map(|j| j.to_report()).collect(),
                },
                Err(e) => api_error(e),
            }
        }
        ApiRequest::PollTick { correlation_id } => {
            match api.install_status(correlation_id.as_deref()) {
                Ok(status) => Event::PollTick {
                    state: WizardState::parse(&status.state),
                    jobs: status.jobs.iter().map(|j| j.to_report()).collect(),
                },
                Err(e) => api_error(e),
            }
        }
        ApiRequest::IncompleteStatus { correlation_id } => {
            match api.incomplete_install_status(correlation_id.as_deref()) {
                Ok(statuses) => Event::IncompleteStatus(statuses),
                Err(e) => api_error(e),
            }
        }
        ApiRequest::LoadCatalog => match api.load_catalog() {
            Ok(catalog) => Event::CatalogLoaded(catalog),
            Err(e) => api_error(e),
        },
        ApiRequest::Install(names) => match api.install(&names) {
            Ok(correlation_id) => Event::Installed { correlation_id },
            Err(e) => api_error(e),
        },
        ApiRequest::RestartStatus => match api.restart_status() {
            Ok(status) => Event::RestartStatus {
                required: status.restart_required,
                supported: status.restart_supported,
            },
            Err(e) => api_error(e),
        },
        ApiRequest::CompleteInstall => match api.complete_install() {
            Ok(()) => Event::AckDone,
            Err(e) => api_error(e),
        },
        ApiRequest::InstallPluginsDone => match api.install_plugins_done() {
            Ok(()) => Event::AckDone,
            Err(e) => api_error(e),
        },
        ApiRequest::SafeRestart => {
            // The server may drop the connection while going down; either
            // way the restart is in flight, so fold the ack into the first
            // liveness ping.
            let _ = api.safe_restart();
            Event::RestartPing {
                reachable: api.ping(),
            }
        }
        ApiRequest::Ping => Event::RestartPing {
            reachable: api.ping(),
        },
        ApiRequest::ServerUrl => match api.server_configured() {
            Ok(configured) => Event::ServerUrl { configured },
            Err(e) => api_error(e),
        },
        ApiRequest::CreateAdminUser(fields) => {
            match api.create_admin_user(&fields) {
                Ok(FormOutcome::Accepted) => Event::FormAccepted(FormKind::FirstUser),
                Ok(FormOutcome::Rejected(errors)) => Event::FormRejected(errors),
                Err(e) => api_error(e),
            }
        }
        ApiRequest::ConfigureInstance(fields) => {
            match api.configure_instance(&fields) {
                Ok(FormOutcome::Accepted) => Event::FormAccepted(FormKind::ConfigureInstance),
                Ok(FormOutcome::Rejected(errors)) => Event::FormRejected(errors),
                Err(e) => api_error(e),
            }
        }
    }
}

fn api_error(error: ClientError) -> Event {
    Event::ApiError {
        message: error.to_string(),
    }
}
