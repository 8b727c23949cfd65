use eframe::egui;
use onboard_client::POLL_INTERVAL;
use onboard_core::wizard::{Command, Event, Extensions, Panel, Wizard};
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

mod panels;
mod worker;

use worker::{spawn_worker, ApiRequest};

const RESTART_PING_INTERVAL: Duration = Duration::from_secs(1);
const FRAME_REPAINT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct GuiConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            title: "Setup Wizard".to_string(),
            width: 960.0,
            height: 640.0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GuiError {
    #[error("gui error: {0}")]
    Gui(String),
}

/// Draft of the first-user form, kept on the UI side until submission.
#[derive(Debug, Clone, Default)]
pub(crate) struct FirstUserForm {
    pub username: String,
    pub password: String,
    pub confirm: String,
    pub fullname: String,
    pub email: String,
}

impl FirstUserForm {
    fn to_fields(&self) -> std::collections::BTreeMap<String, String> {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert("username".to_string(), self.username.clone());
        fields.insert("password1".to_string(), self.password.clone());
        fields.insert("password2".to_string(), self.confirm.clone());
        fields.insert("fullname".to_string(), self.fullname.clone());
        fields.insert("email".to_string(), self.email.clone());
        fields
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SelectionViewState {
    pub query: String,
    pub only_selected: bool,
    /// Plugin names whose dependency list is unfolded.
    pub unfolded: std::collections::HashSet<String>,
}

pub struct WizardApp {
    wizard: Wizard,
    base_url: String,
    locale: String,
    request_tx: Sender<ApiRequest>,
    event_rx: Receiver<Event>,
    last_poll: Option<Instant>,
    last_ping: Option<Instant>,
    pub(crate) selection_view: SelectionViewState,
    pub(crate) first_user_form: FirstUserForm,
    pub(crate) instance_url: String,
}

impl WizardApp {
    pub fn new(base_url: &str, locale: &str) -> Self {
        let (request_tx, event_rx) = spawn_worker(base_url);
        let mut wizard = Wizard::new(locale, Extensions::default());
        let commands = wizard.begin();
        let mut app = Self {
            wizard,
            base_url: base_url.to_string(),
            locale: locale.to_string(),
            request_tx,
            event_rx,
            last_poll: None,
            last_ping: None,
            selection_view: SelectionViewState::default(),
            first_user_form: FirstUserForm::default(),
            instance_url: String::new(),
        };
        app.dispatch(commands);
        app
    }

    pub(crate) fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub(crate) fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn run_commands(&mut self, commands: Vec<Command>) {
        self.dispatch(commands);
    }

    fn send(&self, request: ApiRequest) {
        if self.request_tx.send(request).is_err() {
            log::error!("api worker is gone");
        }
    }

    fn dispatch(&mut self, commands: Vec<Command>) {
        for command in commands {
            let correlation_id = self.wizard.correlation_id().map(str::to_string);
            match command {
                Command::LoadTranslations => self.send(ApiRequest::LoadTranslations),
                Command::CheckConnectivity => self.send(ApiRequest::CheckConnectivity),
                Command::FetchInstallStatus => {
                    self.send(ApiRequest::InstallStatus { correlation_id })
                }
                Command::FetchIncompleteStatus => {
                    self.send(ApiRequest::IncompleteStatus { correlation_id })
                }
                Command::LoadCatalog => self.send(ApiRequest::LoadCatalog),
                Command::Install(names) => {
                    self.last_poll = None;
                    self.send(ApiRequest::Install(names));
                }
                Command::FetchRestartStatus => self.send(ApiRequest::RestartStatus),
                Command::CompleteInstall => self.send(ApiRequest::CompleteInstall),
                Command::InstallPluginsDone => self.send(ApiRequest::InstallPluginsDone),
                Command::SafeRestart => {
                    self.last_ping = Some(Instant::now());
                    self.send(ApiRequest::SafeRestart);
                }
                Command::FetchServerUrl => self.send(ApiRequest::ServerUrl),
                Command::SubmitFirstUser(fields) => {
                    self.send(ApiRequest::CreateAdminUser(fields))
                }
                Command::SubmitConfigureInstance(fields) => {
                    self.send(ApiRequest::ConfigureInstance(fields))
                }
                Command::Reload => self.reload(),
            }
        }
    }

    /// Start over: fresh wizard state against the same server.
    fn reload(&mut self) {
        self.wizard = Wizard::new(&self.locale, Extensions::default());
        self.last_poll = None;
        self.last_ping = None;
        self.selection_view = SelectionViewState::default();
        self.first_user_form = FirstUserForm::default();
        self.instance_url = String::new();
        let commands = self.wizard.begin();
        self.dispatch(commands);
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            let commands = self.wizard.handle(event);
            self.dispatch(commands);
        }
    }

    /// Fixed-cadence timers: install polling while the progress panel is
    /// up, liveness pings while restarting.
    fn tick_timers(&mut self) {
        match self.wizard.panel() {
            Panel::Progress => {
                let due = self
                    .last_poll
                    .map_or(true, |t| t.elapsed() >= POLL_INTERVAL);
                if due {
                    self.last_poll = Some(Instant::now());
                    let correlation_id = self.wizard.correlation_id().map(str::to_string);
                    self.send(ApiRequest::PollTick { correlation_id });
                }
            }
            Panel::Restarting => {
                let due = self
                    .last_ping
                    .map_or(true, |t| t.elapsed() >= RESTART_PING_INTERVAL);
                if due {
                    self.last_ping = Some(Instant::now());
                    self.send(ApiRequest::Ping);
                }
            }
            _ => {}
        }
    }
}

impl eframe::App for WizardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.tick_timers();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_current_panel(ui);
        });

        ctx.request_repaint_after(FRAME_REPAINT);
    }
}

pub fn run_gui(config: GuiConfig, base_url: &str, locale: &str) -> Result<(), GuiError> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([config.width, config.height]),
        ..Default::default()
    };
    let base_url = base_url.to_string();
    let locale = locale.to_string();
    eframe::run_native(
        &config.title,
        options,
        Box::new(move |_cc| Box::new(WizardApp::new(&base_url, &locale))),
    )
    .map_err(|e| GuiError::Gui(e.to_string()))
}
