use crate::WizardApp;
use eframe::egui;

impl WizardApp {
    pub(crate) fn draw_first_user(&mut self, ui: &mut egui::Ui) {
        ui.heading("Create first admin user");
        ui.add_space(8.0);

        egui::Grid::new("first_user_form").num_columns(2).show(ui, |ui| {
            ui.label("Username:");
            ui.text_edit_singleline(&mut self.first_user_form.username);
            ui.end_row();
            ui.label("Password:");
            ui.add(egui::TextEdit::singleline(&mut self.first_user_form.password).password(true));
            ui.end_row();
            ui.label("Confirm password:");
            ui.add(egui::TextEdit::singleline(&mut self.first_user_form.confirm).password(true));
            ui.end_row();
            ui.label("Full name:");
            ui.text_edit_singleline(&mut self.first_user_form.fullname);
            ui.end_row();
            ui.label("E-mail address:");
            ui.text_edit_singleline(&mut self.first_user_form.email);
            ui.end_row();
        });

        self.draw_field_errors(ui);

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if self.action_button(ui, "Save and continue") {
                let fields = self.first_user_form.to_fields();
                let commands = self.wizard_mut().submit_first_user(fields);
                self.run_commands(commands);
            }
            if ui.link("Skip and continue as admin").clicked() {
                let commands = self.wizard_mut().skip_first_user();
                self.run_commands(commands);
            }
        });
    }

    pub(crate) fn draw_configure_instance(&mut self, ui: &mut egui::Ui) {
        ui.heading("Instance configuration");
        ui.add_space(8.0);
        if self.instance_url.is_empty() {
            self.instance_url = format!("{}/", self.base_url());
        }
        ui.horizontal(|ui| {
            ui.label("Server URL:");
            ui.text_edit_singleline(&mut self.instance_url);
        });

        self.draw_field_errors(ui);

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if self.action_button(ui, "Save and finish") {
                let mut fields = std::collections::BTreeMap::new();
                fields.insert("rootUrl".to_string(), self.instance_url.clone());
                let commands = self.wizard_mut().submit_configure_instance(fields);
                self.run_commands(commands);
            }
            if ui.link("Not now").clicked() {
                let commands = self.wizard_mut().skip_configure_instance();
                self.run_commands(commands);
            }
        });
    }

    /// Validation failures are shown inline, keyed by field.
    fn draw_field_errors(&mut self, ui: &mut egui::Ui) {
        let errors: Vec<(String, String)> = self
            .wizard()
            .field_errors()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if errors.is_empty() {
            return;
        }
        ui.add_space(8.0);
        for (field, message) in errors {
            ui.colored_label(egui::Color32::LIGHT_RED, format!("{field}: {message}"));
        }
    }
}
