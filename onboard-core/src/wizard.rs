//! Setup wizard state machine.
//!
//! The wizard owns all mutable setup state (catalog, selection, install
//! progress, translations, current panel) and is driven entirely through
//! [`Wizard::handle`] and the action methods. It never performs I/O: each
//! step returns [`Command`]s for the host to execute, and the host feeds
//! the results back as [`Event`]s. This keeps every transition testable
//! without a server or a UI.

use crate::catalog::{Catalog, Selection};
use crate::i18n::{
    Translations, KEY_CONFIGURE_INSTANCE_SKIPPED, KEY_ERROR_CONNECTION, KEY_ERROR_MESSAGE,
    KEY_ERROR_RESTART_NOT_SUPPORTED, KEY_FIRST_USER_SKIPPED,
};
use crate::install::{InstallProgress, JobReport, ProgressSnapshot};
use std::collections::{BTreeMap, HashMap};

/// Abstract setup state as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    Default,
    CreateAdminUser,
    ConfigureInstance,
    Running,
    InitialSetupCompleted,
    InitialPluginsInstalling,
    Other(String),
}

impl WizardState {
    pub fn parse(raw: &str) -> WizardState {
        match raw {
            "DEFAULT" => WizardState::Default,
            "CREATE_ADMIN_USER" => WizardState::CreateAdminUser,
            "CONFIGURE_INSTANCE" => WizardState::ConfigureInstance,
            "RUNNING" => WizardState::Running,
            "INITIAL_SETUP_COMPLETED" => WizardState::InitialSetupCompleted,
            "INITIAL_PLUGINS_INSTALLING" => WizardState::InitialPluginsInstalling,
            other => WizardState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WizardState::Default => "DEFAULT",
            WizardState::CreateAdminUser => "CREATE_ADMIN_USER",
            WizardState::ConfigureInstance => "CONFIGURE_INSTANCE",
            WizardState::Running => "RUNNING",
            WizardState::InitialSetupCompleted => "INITIAL_SETUP_COMPLETED",
            WizardState::InitialPluginsInstalling => "INITIAL_PLUGINS_INSTALLING",
            WizardState::Other(s) => s,
        }
    }
}

/// The panel currently on screen. Exactly one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Loading,
    Welcome,
    Offline { fatal: bool },
    PluginSelection,
    Progress,
    InstallSummary { failed: Vec<String> },
    FirstUser,
    ConfigureInstance,
    SetupComplete { restart_required: bool, restart_supported: bool, message: String },
    IncompleteInstallation,
    Restarting,
    Error { message: String },
}

/// Effects the host must perform. Every variant maps to one client call
/// (or, for [`Command::Reload`], a full wizard restart).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadTranslations,
    CheckConnectivity,
    FetchInstallStatus,
    FetchIncompleteStatus,
    LoadCatalog,
    Install(Vec<String>),
    FetchRestartStatus,
    CompleteInstall,
    InstallPluginsDone,
    SafeRestart,
    FetchServerUrl,
    SubmitFirstUser(BTreeMap<String, String>),
    SubmitConfigureInstance(BTreeMap<String, String>),
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    FirstUser,
    ConfigureInstance,
}

/// Results of executed commands, fed back into [`Wizard::handle`].
#[derive(Debug, Clone)]
pub enum Event {
    TranslationsLoaded(HashMap<String, String>),
    Connectivity { online: bool, fatal: bool },
    InstallStatus { state: WizardState, jobs: Vec<JobReport> },
    IncompleteStatus(BTreeMap<String, String>),
    CatalogLoaded(Catalog),
    Installed { correlation_id: String },
    PollTick { state: WizardState, jobs: Vec<JobReport> },
    RestartStatus { required: bool, supported: bool },
    RestartPing { reachable: bool },
    ServerUrl { configured: bool },
    FormAccepted(FormKind),
    FormRejected(BTreeMap<String, String>),
    AckDone,
    ApiError { message: String },
}

/// What to do with the catalog once it arrives. The catalog loads lazily,
/// on the first transition that needs plugin metadata.
#[derive(Debug, Clone)]
enum AfterCatalog {
    ShowSelection,
    InstallRecommended,
    ResumeFromJobs { state: WizardState, jobs: Vec<JobReport> },
    Incomplete { statuses: BTreeMap<String, String> },
}

/// Custom state handlers and actions registered at construction time.
/// Handlers take the wizard and return follow-up commands; a handler for
/// a known state string replaces the built-in dispatch for that state.
#[derive(Default)]
pub struct Extensions {
    pub state_handlers: HashMap<String, fn(&mut Wizard) -> Vec<Command>>,
    pub actions: HashMap<String, fn(&mut Wizard) -> Vec<Command>>,
    pub translation_overrides: HashMap<String, String>,
}

pub struct Wizard {
    panel: Panel,
    translations: Translations,
    catalog: Catalog,
    selection: Selection,
    progress: InstallProgress,
    /// Last poll snapshot. Its total can exceed the tracked plugin count
    /// when the server reports extra dependency jobs, so the progress bar
    /// reads this rather than recounting tracked plugins.
    snapshot: ProgressSnapshot,
    correlation_id: Option<String>,
    after_catalog: Option<AfterCatalog>,
    extensions: Extensions,
    locale: String,
    /// Skip flags feed the setup-complete message.
    first_user_skipped: bool,
    configure_instance_skipped: bool,
    field_errors: BTreeMap<String, String>,
    /// While restarting, the server must be seen down before a reachable
    /// ping counts as "back up".
    restart_seen_down: bool,
    busy: bool,
}

impl Wizard {
    pub fn new(locale: &str, extensions: Extensions) -> Self {
        Self {
            panel: Panel::Loading,
            translations: Translations::default(),
            catalog: Catalog::default(),
            selection: Selection::default(),
            progress: InstallProgress::default(),
            snapshot: ProgressSnapshot::default(),
            correlation_id: None,
            after_catalog: None,
            extensions,
            locale: locale.to_string(),
            first_user_skipped: false,
            configure_instance_skipped: false,
            field_errors: BTreeMap::new(),
            restart_seen_down: false,
            busy: false,
        }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn progress(&self) -> &InstallProgress {
        &self.progress
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        self.snapshot
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    /// Actions should be disabled while a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Initial command batch. Connectivity gates everything else.
    pub fn begin(&mut self) -> Vec<Command> {
        self.panel = Panel::Loading;
        vec![Command::LoadTranslations, Command::CheckConnectivity]
    }

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        self.busy = false;
        match event {
            Event::TranslationsLoaded(map) => {
                self.translations = Translations::from_map(map);
                let overrides = self.extensions.translation_overrides.clone();
                self.translations.apply_overrides(overrides);
                vec![]
            }
            Event::Connectivity { online, fatal } => {
                if online {
                    vec![Command::FetchInstallStatus]
                } else {
                    if fatal {
                        log::error!("update site unreachable, installation cannot proceed");
                    }
                    self.panel = Panel::Offline { fatal };
                    vec![]
                }
            }
            Event::InstallStatus { state, jobs } => self.on_install_status(state, jobs),
            Event::IncompleteStatus(statuses) => {
                if statuses.is_empty() {
                    self.dispatch_state(WizardState::Default)
                } else {
                    self.request_catalog(AfterCatalog::Incomplete { statuses })
                }
            }
            Event::CatalogLoaded(catalog) => {
                self.catalog = catalog;
                self.after_catalog_ready()
            }
            Event::Installed { correlation_id } => {
                self.correlation_id = Some(correlation_id);
                vec![]
            }
            Event::PollTick { state, jobs } => self.on_poll_tick(state, jobs),
            Event::RestartStatus { required, supported } => {
                let mut message = self.skip_message();
                if required && !supported {
                    if !message.is_empty() {
                        message.push(' ');
                    }
                    message.push_str(self.translations.get(KEY_ERROR_RESTART_NOT_SUPPORTED));
                }
                self.panel = Panel::SetupComplete {
                    restart_required: required,
                    restart_supported: supported,
                    message,
                };
                vec![]
            }
            Event::RestartPing { reachable } => {
                if self.panel != Panel::Restarting {
                    return vec![];
                }
                if !reachable {
                    self.restart_seen_down = true;
                    vec![]
                } else if self.restart_seen_down {
                    vec![Command::Reload]
                } else {
                    vec![]
                }
            }
            Event::ServerUrl { configured } => {
                if configured {
                    vec![Command::CompleteInstall]
                } else {
                    self.panel = Panel::ConfigureInstance;
                    vec![]
                }
            }
            Event::FormAccepted(kind) => {
                self.field_errors.clear();
                match kind {
                    // The server advances its own state after a form is
                    // accepted; re-dispatch from what it now reports.
                    FormKind::FirstUser | FormKind::ConfigureInstance => {
                        vec![Command::FetchInstallStatus]
                    }
                }
            }
            Event::FormRejected(errors) => {
                self.field_errors = errors;
                vec![]
            }
            Event::AckDone => vec![Command::FetchInstallStatus],
            Event::ApiError { message } => {
                self.panel = Panel::Error {
                    message: self.resolve_error_message(&message),
                };
                vec![]
            }
        }
    }

    fn on_install_status(&mut self, state: WizardState, jobs: Vec<JobReport>) -> Vec<Command> {
        if jobs.is_empty() {
            return vec![Command::FetchIncompleteStatus];
        }
        if self.progress.is_empty() {
            // Resuming: rebuild the selection from the jobs the user
            // originally picked (only those carry a correlation id).
            let names: Vec<String> = jobs
                .iter()
                .filter(|j| j.selected_by_user)
                .map(|j| j.name.clone())
                .collect();
            self.selection = Selection::from_names(names);
            self.request_catalog(AfterCatalog::ResumeFromJobs { state, jobs })
        } else {
            self.dispatch_state(state)
        }
    }

    fn on_poll_tick(&mut self, state: WizardState, jobs: Vec<JobReport>) -> Vec<Command> {
        if self.panel != Panel::Progress {
            // A stale tick after the user navigated away.
            return vec![];
        }
        let snapshot = self.progress.apply_jobs(&jobs);
        self.snapshot = snapshot;
        let installing = state == WizardState::InitialPluginsInstalling;
        if self.progress.complete(snapshot, installing) {
            let failed = self.progress.failed_names().to_vec();
            if failed.is_empty() {
                self.busy = true;
                vec![Command::InstallPluginsDone]
            } else {
                self.panel = Panel::InstallSummary { failed };
                vec![]
            }
        } else {
            vec![]
        }
    }

    /// Server-state dispatch: one panel per abstract state, unrecognized
    /// states fall back to the welcome panel. Registered handlers take
    /// precedence over the built-ins.
    fn dispatch_state(&mut self, state: WizardState) -> Vec<Command> {
        if let Some(handler) = self.extensions.state_handlers.get(state.as_str()).copied() {
            return handler(self);
        }
        match state {
            WizardState::CreateAdminUser => {
                self.panel = Panel::FirstUser;
                vec![]
            }
            WizardState::ConfigureInstance => {
                self.panel = Panel::ConfigureInstance;
                vec![]
            }
            WizardState::Running | WizardState::InitialSetupCompleted => {
                self.busy = true;
                vec![Command::FetchRestartStatus]
            }
            WizardState::InitialPluginsInstalling => {
                self.panel = Panel::Progress;
                vec![]
            }
            WizardState::Default | WizardState::Other(_) => {
                self.panel = Panel::Welcome;
                vec![]
            }
        }
    }

    fn request_catalog(&mut self, then: AfterCatalog) -> Vec<Command> {
        self.after_catalog = Some(then);
        if self.catalog.is_empty() {
            self.busy = true;
            vec![Command::LoadCatalog]
        } else {
            self.after_catalog_ready()
        }
    }

    fn after_catalog_ready(&mut self) -> Vec<Command> {
        match self.after_catalog.take() {
            Some(AfterCatalog::ShowSelection) => {
                self.select_recommended();
                self.panel = Panel::PluginSelection;
                vec![]
            }
            Some(AfterCatalog::InstallRecommended) => {
                self.select_recommended();
                let names = self.selection.in_catalog_order(&self.catalog);
                self.start_install(names)
            }
            Some(AfterCatalog::ResumeFromJobs { state, jobs }) => {
                let names = self.selection.in_catalog_order(&self.catalog);
                self.progress = InstallProgress::from_selection(&self.catalog, &names);
                self.snapshot = self.progress.apply_jobs(&jobs);
                self.dispatch_state(state)
            }
            Some(AfterCatalog::Incomplete { statuses }) => {
                let names: Vec<String> = statuses.keys().cloned().collect();
                self.selection = Selection::from_names(names.iter().cloned());
                self.progress = InstallProgress::from_selection(&self.catalog, &names);
                self.progress.apply_incomplete(&statuses);
                self.snapshot = ProgressSnapshot {
                    complete: 0,
                    total: self.progress.plugins().len(),
                };
                self.panel = Panel::IncompleteInstallation;
                vec![]
            }
            None => vec![],
        }
    }

    fn select_recommended(&mut self) {
        let recommended = self.catalog.recommended_plugin_names(&self.locale);
        self.selection = Selection::from_names(recommended);
    }

    fn start_install(&mut self, names: Vec<String>) -> Vec<Command> {
        self.progress = InstallProgress::from_selection(&self.catalog, &names);
        self.snapshot = ProgressSnapshot {
            complete: 0,
            total: self.progress.plugins().len(),
        };
        // The progress panel goes up before the install request resolves.
        self.panel = Panel::Progress;
        self.busy = true;
        vec![Command::Install(names)]
    }

    fn skip_message(&self) -> String {
        let mut parts = Vec::new();
        if self.first_user_skipped {
            parts.push(self.translations.get(KEY_FIRST_USER_SKIPPED));
        }
        if self.configure_instance_skipped {
            parts.push(self.translations.get(KEY_CONFIGURE_INSTANCE_SKIPPED));
        }
        parts.join(" ")
    }

    /// Empty messages and timeouts get the canned connection message;
    /// anything else is prefixed with the generic error text.
    fn resolve_error_message(&self, raw: &str) -> String {
        if raw.is_empty() || raw.contains("timeout") || raw.contains("timed out") {
            self.translations.get(KEY_ERROR_CONNECTION).to_string()
        } else {
            format!("{} {}", self.translations.get(KEY_ERROR_MESSAGE), raw)
        }
    }

    // ---- user actions -------------------------------------------------

    pub fn install_recommended(&mut self) -> Vec<Command> {
        self.request_catalog(AfterCatalog::InstallRecommended)
    }

    pub fn open_custom_selection(&mut self) -> Vec<Command> {
        self.request_catalog(AfterCatalog::ShowSelection)
    }

    pub fn toggle_plugin(&mut self, name: &str) {
        self.selection.toggle(name);
    }

    pub fn select_all(&mut self) {
        let names: Vec<String> = self.catalog.all_names().to_vec();
        self.selection = Selection::from_names(names);
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    pub fn select_recommended_only(&mut self) {
        self.select_recommended();
    }

    pub fn install_selected(&mut self) -> Vec<Command> {
        let names = self.selection.in_catalog_order(&self.catalog);
        self.start_install(names)
    }

    /// Proceed without installing anything. The server still needs the
    /// empty install call to advance its setup state.
    pub fn skip_plugins(&mut self) -> Vec<Command> {
        self.start_install(Vec::new())
    }

    pub fn retry_failed(&mut self) -> Vec<Command> {
        let failed = self.progress.failed_names().to_vec();
        self.selection = Selection::from_names(failed.iter().cloned());
        self.start_install(failed)
    }

    /// Accept the failures and move on; the server is told to stop
    /// retrying the remaining jobs.
    pub fn continue_with_failed(&mut self) -> Vec<Command> {
        self.progress.clear_failed();
        self.busy = true;
        vec![Command::InstallPluginsDone]
    }

    pub fn resume_installation(&mut self) -> Vec<Command> {
        let pending = self.progress.pending_names();
        self.panel = Panel::Progress;
        self.busy = true;
        vec![Command::Install(pending)]
    }

    pub fn submit_first_user(&mut self, fields: BTreeMap<String, String>) -> Vec<Command> {
        self.busy = true;
        vec![Command::SubmitFirstUser(fields)]
    }

    /// Skipping the first user defers account creation; whether instance
    /// configuration is still needed depends on the server URL already
    /// being set.
    pub fn skip_first_user(&mut self) -> Vec<Command> {
        self.first_user_skipped = true;
        self.busy = true;
        vec![Command::FetchServerUrl]
    }

    pub fn submit_configure_instance(&mut self, fields: BTreeMap<String, String>) -> Vec<Command> {
        self.busy = true;
        vec![Command::SubmitConfigureInstance(fields)]
    }

    pub fn skip_configure_instance(&mut self) -> Vec<Command> {
        self.configure_instance_skipped = true;
        self.busy = true;
        vec![Command::CompleteInstall]
    }

    pub fn restart(&mut self) -> Vec<Command> {
        self.panel = Panel::Restarting;
        self.restart_seen_down = false;
        vec![Command::SafeRestart]
    }

    pub fn finish(&mut self) -> Vec<Command> {
        self.busy = true;
        vec![Command::CompleteInstall]
    }

    pub fn start_over(&mut self) -> Vec<Command> {
        vec![Command::Reload]
    }

    /// Named-action dispatch, the hook point for registered actions.
    pub fn run_action(&mut self, name: &str) -> Vec<Command> {
        if let Some(action) = self.extensions.actions.get(name).copied() {
            return action(self);
        }
        match name {
            "install-recommended" => self.install_recommended(),
            "open-custom" => self.open_custom_selection(),
            "install-selected" => self.install_selected(),
            "skip-plugins" => self.skip_plugins(),
            "retry-failed" => self.retry_failed(),
            "continue-with-failed" => self.continue_with_failed(),
            "resume-installation" => self.resume_installation(),
            "skip-first-user" => self.skip_first_user(),
            "skip-configure-instance" => self.skip_configure_instance(),
            "restart" => self.restart(),
            "finish" => self.finish(),
            "start-over" => self.start_over(),
            other => {
                log::warn!("unknown wizard action {other}");
                vec![]
            }
        }
    }
}
