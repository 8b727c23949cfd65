use crate::WizardApp;
use eframe::egui;

impl WizardApp {
    pub(crate) fn draw_welcome(&mut self, ui: &mut egui::Ui) {
        ui.heading("Customize your installation");
        ui.add_space(8.0);
        ui.label("Plugins extend the server with additional features.");
        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if self.action_button(ui, "Install suggested plugins") {
                let commands = self.wizard_mut().install_recommended();
                self.run_commands(commands);
            }
            if self.action_button(ui, "Select plugins to install") {
                let commands = self.wizard_mut().open_custom_selection();
                self.run_commands(commands);
            }
        });
        ui.add_space(8.0);
        if ui.link("Continue without installing plugins").clicked() {
            let commands = self.wizard_mut().skip_plugins();
            self.run_commands(commands);
        }
    }

    pub(crate) fn draw_offline(&mut self, ui: &mut egui::Ui, fatal: bool) {
        ui.heading("Offline");
        ui.add_space(8.0);
        if fatal {
            ui.label("The update site cannot be reached, so plugins cannot be installed.");
        } else {
            ui.label("This server appears to be offline. Plugin installation needs a connection to the update site.");
        }
        ui.add_space(16.0);
        if self.action_button(ui, "Retry") {
            let commands = self.wizard_mut().begin();
            self.run_commands(commands);
        }
        if ui.link("Skip plugin installation").clicked() {
            let commands = self.wizard_mut().skip_plugins();
            self.run_commands(commands);
        }
    }

    pub(crate) fn draw_error(&mut self, ui: &mut egui::Ui, message: &str) {
        ui.heading("An error occurred");
        ui.add_space(8.0);
        ui.colored_label(egui::Color32::LIGHT_RED, message);
        ui.add_space(16.0);
        if self.action_button(ui, "Start over") {
            let commands = self.wizard_mut().start_over();
            self.run_commands(commands);
        }
    }

    pub(crate) fn draw_incomplete(&mut self, ui: &mut egui::Ui) {
        ui.heading("Resume installation");
        ui.add_space(8.0);
        ui.label("A previous setup was interrupted before it finished.");
        ui.add_space(8.0);
        for plugin in self.wizard().progress().plugins() {
            ui.horizontal(|ui| {
                ui.label(&plugin.title);
                ui.weak(format!("{:?}", plugin.status));
            });
        }
        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if self.action_button(ui, "Resume") {
                let commands = self.wizard_mut().resume_installation();
                self.run_commands(commands);
            }
            if self.action_button(ui, "Start over") {
                let commands = self.wizard_mut().start_over();
                self.run_commands(commands);
            }
        });
    }
}
