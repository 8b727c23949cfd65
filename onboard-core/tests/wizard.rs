use onboard_core::catalog::{Catalog, CategoryEntry, Plugin, PluginCategory};
use onboard_core::install::{JobReport, JobStatus};
use onboard_core::wizard::{Command, Event, Extensions, Panel, Wizard, WizardState};
use std::collections::BTreeMap;

fn plugin(name: &str) -> Plugin {
    Plugin {
        name: name.to_string(),
        title: String::new(),
        excerpt: None,
        dependencies: BTreeMap::new(),
        needed_dependencies: Vec::new(),
    }
}

fn entry(name: &str, suggested: bool) -> CategoryEntry {
    CategoryEntry {
        name: name.to_string(),
        title: None,
        excerpt: None,
        usage: None,
        suggested,
    }
}

fn catalog() -> Catalog {
    Catalog::from_parts(
        vec![plugin("git"), plugin("subversion")],
        vec![PluginCategory {
            category: "SCM".to_string(),
            plugins: vec![entry("git", true), entry("subversion", false)],
        }],
    )
}

fn job(name: &str, wire: &str, selected: bool) -> JobReport {
    JobReport {
        name: name.to_string(),
        title: None,
        status: JobStatus::classify(wire),
        selected_by_user: selected,
    }
}

/// Drives the wizard to the welcome panel with a loaded catalog cached.
fn ready_wizard() -> Wizard {
    let mut wizard = Wizard::new("en", Extensions::default());
    wizard.begin();
    wizard.handle(Event::Connectivity {
        online: true,
        fatal: false,
    });
    wizard.handle(Event::InstallStatus {
        state: WizardState::Default,
        jobs: vec![],
    });
    wizard.handle(Event::IncompleteStatus(BTreeMap::new()));
    wizard
}

#[test]
fn startup_checks_connectivity_before_anything_else() {
    let mut wizard = Wizard::new("en", Extensions::default());
    let commands = wizard.begin();
    assert!(commands.contains(&Command::CheckConnectivity));
    assert_eq!(*wizard.panel(), Panel::Loading);
}

#[test]
fn offline_shows_offline_panel() {
    let mut wizard = Wizard::new("en", Extensions::default());
    wizard.begin();
    let commands = wizard.handle(Event::Connectivity {
        online: false,
        fatal: true,
    });
    assert!(commands.is_empty());
    assert_eq!(*wizard.panel(), Panel::Offline { fatal: true });
}

#[test]
fn no_jobs_and_no_incomplete_lands_on_welcome() {
    let wizard = ready_wizard();
    assert_eq!(*wizard.panel(), Panel::Welcome);
}

#[test]
fn unrecognized_server_state_falls_back_to_welcome() {
    let mut wizard = Wizard::new("en", Extensions::default());
    wizard.begin();
    wizard.handle(Event::Connectivity {
        online: true,
        fatal: false,
    });
    wizard.handle(Event::InstallStatus {
        state: WizardState::Other("SOMETHING_NEW".to_string()),
        jobs: vec![job("git", "Installing", true)],
    });
    wizard.handle(Event::CatalogLoaded(catalog()));
    assert_eq!(*wizard.panel(), Panel::Welcome);
}

#[test]
fn jobs_without_tracked_plugins_rebuild_selection_from_correlation() {
    let mut wizard = Wizard::new("en", Extensions::default());
    wizard.begin();
    wizard.handle(Event::Connectivity {
        online: true,
        fatal: false,
    });
    let commands = wizard.handle(Event::InstallStatus {
        state: WizardState::InitialPluginsInstalling,
        jobs: vec![
            job("git", "Installing", true),
            job("scm-api", "Installing", false),
        ],
    });
    assert_eq!(commands, vec![Command::LoadCatalog]);
    wizard.handle(Event::CatalogLoaded(catalog()));
    assert!(wizard.selection().contains("git"));
    assert!(!wizard.selection().contains("scm-api"));
    assert_eq!(*wizard.panel(), Panel::Progress);
}

#[test]
fn incomplete_install_offers_resume() {
    let mut wizard = Wizard::new("en", Extensions::default());
    wizard.begin();
    wizard.handle(Event::Connectivity {
        online: true,
        fatal: false,
    });
    wizard.handle(Event::InstallStatus {
        state: WizardState::Default,
        jobs: vec![],
    });
    let mut statuses = BTreeMap::new();
    statuses.insert("git".to_string(), "Installing".to_string());
    let commands = wizard.handle(Event::IncompleteStatus(statuses));
    assert_eq!(commands, vec![Command::LoadCatalog]);
    wizard.handle(Event::CatalogLoaded(catalog()));
    assert_eq!(*wizard.panel(), Panel::IncompleteInstallation);

    let commands = wizard.resume_installation();
    assert_eq!(commands, vec![Command::Install(vec!["git".to_string()])]);
    assert_eq!(*wizard.panel(), Panel::Progress);
}

#[test]
fn install_selected_moves_to_progress_before_any_poll() {
    let mut wizard = ready_wizard();
    wizard.handle(Event::CatalogLoaded(catalog()));
    wizard.selection_mut().clear();
    wizard.toggle_plugin("subversion");
    let commands = wizard.install_selected();
    assert_eq!(
        commands,
        vec![Command::Install(vec!["subversion".to_string()])]
    );
    // The progress panel is up before the install request resolves.
    assert_eq!(*wizard.panel(), Panel::Progress);
}

#[test]
fn install_recommended_selects_suggested_plugins() {
    let mut wizard = ready_wizard();
    let commands = wizard.install_recommended();
    assert_eq!(commands, vec![Command::LoadCatalog]);
    let commands = wizard.handle(Event::CatalogLoaded(catalog()));
    assert_eq!(commands, vec![Command::Install(vec!["git".to_string()])]);
}

#[test]
fn poll_completion_fires_exactly_once() {
    let mut wizard = ready_wizard();
    wizard.handle(Event::CatalogLoaded(catalog()));
    wizard.toggle_plugin("subversion");
    wizard.install_selected();
    wizard.handle(Event::Installed {
        correlation_id: "abc".to_string(),
    });

    let tick = Event::PollTick {
        state: WizardState::Running,
        jobs: vec![job("subversion", "Success", true)],
    };
    let commands = wizard.handle(tick.clone());
    assert_eq!(commands, vec![Command::InstallPluginsDone]);
    let commands = wizard.handle(tick);
    assert!(commands.is_empty());
}

#[test]
fn failed_jobs_end_in_install_summary() {
    let mut wizard = ready_wizard();
    wizard.handle(Event::CatalogLoaded(catalog()));
    wizard.toggle_plugin("subversion");
    wizard.install_selected();
    wizard.handle(Event::PollTick {
        state: WizardState::Running,
        jobs: vec![job("subversion", "Failure", true)],
    });
    assert_eq!(
        *wizard.panel(),
        Panel::InstallSummary {
            failed: vec!["subversion".to_string()]
        }
    );

    let commands = wizard.retry_failed();
    assert_eq!(
        commands,
        vec![Command::Install(vec!["subversion".to_string()])]
    );
    assert_eq!(*wizard.panel(), Panel::Progress);
}

#[test]
fn poll_snapshot_counts_server_reported_dependency_jobs() {
    let mut wizard = ready_wizard();
    wizard.handle(Event::CatalogLoaded(catalog()));
    wizard.selection_mut().clear();
    wizard.toggle_plugin("git");
    wizard.install_selected();
    assert_eq!(wizard.progress_snapshot().total, 1);

    // The server reports a dependency job the tracked list never had.
    wizard.handle(Event::PollTick {
        state: WizardState::InitialPluginsInstalling,
        jobs: vec![
            job("git", "Success", true),
            job("scm-api", "Installing", false),
        ],
    });
    let snapshot = wizard.progress_snapshot();
    assert_eq!(snapshot.complete, 1);
    assert_eq!(snapshot.total, 2);
}

#[test]
fn stale_poll_tick_after_navigation_is_ignored() {
    let mut wizard = ready_wizard();
    let commands = wizard.handle(Event::PollTick {
        state: WizardState::Running,
        jobs: vec![job("subversion", "Success", true)],
    });
    assert!(commands.is_empty());
    assert_eq!(*wizard.panel(), Panel::Welcome);
}

#[test]
fn setup_complete_reports_restart_status() {
    let mut wizard = ready_wizard();
    wizard.handle(Event::CatalogLoaded(catalog()));
    let commands = wizard.handle(Event::InstallStatus {
        state: WizardState::InitialSetupCompleted,
        jobs: vec![job("git", "Success", true)],
    });
    assert_eq!(commands, vec![Command::FetchRestartStatus]);
    wizard.handle(Event::RestartStatus {
        required: true,
        supported: true,
    });
    assert_eq!(
        *wizard.panel(),
        Panel::SetupComplete {
            restart_required: true,
            restart_supported: true,
            message: String::new()
        }
    );
}

#[test]
fn restart_waits_for_down_then_up() {
    let mut wizard = ready_wizard();
    let commands = wizard.restart();
    assert_eq!(commands, vec![Command::SafeRestart]);
    assert_eq!(*wizard.panel(), Panel::Restarting);

    // Still answering: the restart has not taken hold yet.
    assert!(wizard.handle(Event::RestartPing { reachable: true }).is_empty());
    assert!(wizard.handle(Event::RestartPing { reachable: false }).is_empty());
    let commands = wizard.handle(Event::RestartPing { reachable: true });
    assert_eq!(commands, vec![Command::Reload]);
}

#[test]
fn skip_first_user_checks_server_url() {
    let mut wizard = ready_wizard();
    let commands = wizard.skip_first_user();
    assert_eq!(commands, vec![Command::FetchServerUrl]);
    let commands = wizard.handle(Event::ServerUrl { configured: false });
    assert!(commands.is_empty());
    assert_eq!(*wizard.panel(), Panel::ConfigureInstance);
}

#[test]
fn form_rejection_keeps_field_errors() {
    let mut wizard = ready_wizard();
    wizard.handle(Event::CatalogLoaded(catalog()));
    wizard.handle(Event::InstallStatus {
        state: WizardState::CreateAdminUser,
        jobs: vec![job("git", "Success", true)],
    });
    assert_eq!(*wizard.panel(), Panel::FirstUser);

    let mut errors = BTreeMap::new();
    errors.insert("username".to_string(), "is required".to_string());
    wizard.handle(Event::FormRejected(errors));
    assert_eq!(
        wizard.field_errors().get("username").map(String::as_str),
        Some("is required")
    );
}

#[test]
fn api_error_falls_back_to_connection_message() {
    let mut wizard = ready_wizard();
    let mut map = std::collections::HashMap::new();
    map.insert(
        "installWizard_error_connection".to_string(),
        "No connection".to_string(),
    );
    wizard.handle(Event::TranslationsLoaded(map));
    wizard.handle(Event::ApiError {
        message: String::new(),
    });
    assert_eq!(
        *wizard.panel(),
        Panel::Error {
            message: "No connection".to_string()
        }
    );
}

#[test]
fn timed_out_api_error_uses_connection_message() {
    let mut wizard = ready_wizard();
    let mut map = std::collections::HashMap::new();
    map.insert(
        "installWizard_error_connection".to_string(),
        "No connection".to_string(),
    );
    wizard.handle(Event::TranslationsLoaded(map));
    wizard.handle(Event::ApiError {
        message: "connection failed: Network Error: timed out reading response".to_string(),
    });
    assert_eq!(
        *wizard.panel(),
        Panel::Error {
            message: "No connection".to_string()
        }
    );
}

#[test]
fn registered_action_overrides_builtin() {
    fn custom(wizard: &mut Wizard) -> Vec<Command> {
        wizard.select_all();
        vec![]
    }
    let mut extensions = Extensions::default();
    extensions.actions.insert("install-recommended".to_string(), custom);
    let mut wizard = Wizard::new("en", extensions);
    wizard.begin();
    let commands = wizard.run_action("install-recommended");
    assert!(commands.is_empty());
}
