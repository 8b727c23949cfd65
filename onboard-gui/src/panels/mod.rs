//! One drawing routine per wizard panel. All of them read wizard state
//! and feed user actions back through `run_commands`.

mod complete;
mod forms;
mod progress;
mod selection;
mod welcome;

use crate::WizardApp;
use eframe::egui;
use onboard_core::wizard::Panel;

impl WizardApp {
    pub(crate) fn draw_current_panel(&mut self, ui: &mut egui::Ui) {
        let panel = self.wizard().panel().clone();
        match panel {
            Panel::Loading => {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            }
            Panel::Welcome => self.draw_welcome(ui),
            Panel::Offline { fatal } => self.draw_offline(ui, fatal),
            Panel::PluginSelection => self.draw_selection(ui),
            Panel::Progress => self.draw_progress(ui),
            Panel::InstallSummary { failed } => self.draw_install_summary(ui, &failed),
            Panel::FirstUser => self.draw_first_user(ui),
            Panel::ConfigureInstance => self.draw_configure_instance(ui),
            Panel::SetupComplete {
                restart_required,
                restart_supported,
                message,
            } => self.draw_setup_complete(ui, restart_required, restart_supported, &message),
            Panel::IncompleteInstallation => self.draw_incomplete(ui),
            Panel::Restarting => self.draw_restarting(ui),
            Panel::Error { message } => self.draw_error(ui, &message),
        }
    }

    /// Buttons stay clickable only while no request is in flight.
    pub(crate) fn action_button(&mut self, ui: &mut egui::Ui, label: &str) -> bool {
        ui.add_enabled(!self.wizard().is_busy(), egui::Button::new(label))
            .clicked()
    }
}
