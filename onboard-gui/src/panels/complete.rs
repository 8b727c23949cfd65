use crate::WizardApp;
use eframe::egui;

impl WizardApp {
    pub(crate) fn draw_setup_complete(
        &mut self,
        ui: &mut egui::Ui,
        restart_required: bool,
        restart_supported: bool,
        message: &str,
    ) {
        ui.heading("Setup is complete");
        ui.add_space(8.0);
        if !message.is_empty() {
            ui.label(message);
            ui.add_space(8.0);
        }
        if restart_required {
            if restart_supported {
                ui.label("A restart is required before the server can be used.");
                ui.add_space(16.0);
                if self.action_button(ui, "Restart now") {
                    let commands = self.wizard_mut().restart();
                    self.run_commands(commands);
                }
            } else {
                ui.label("A manual restart is required before the server can be used.");
            }
            return;
        }
        ui.label("The server is ready.");
        ui.add_space(16.0);
        if self.action_button(ui, "Start using the server") {
            let commands = self.wizard_mut().finish();
            self.run_commands(commands);
        }
    }

    pub(crate) fn draw_restarting(&mut self, ui: &mut egui::Ui) {
        ui.heading("Restarting");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Waiting for the server to come back...");
        });
    }
}
