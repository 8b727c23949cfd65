use crate::WizardApp;
use eframe::egui;
use onboard_core::install::JobStatus;

impl WizardApp {
    pub(crate) fn draw_progress(&mut self, ui: &mut egui::Ui) {
        ui.heading("Getting started");
        ui.add_space(8.0);

        let plugins: Vec<(String, JobStatus)> = self
            .wizard()
            .progress()
            .plugins()
            .iter()
            .map(|p| (p.title.clone(), p.status))
            .collect();
        // The poll snapshot counts every server job, dependencies included,
        // so it can run past the tracked plugin list.
        let snapshot = self.wizard().progress_snapshot();

        ui.add(
            egui::ProgressBar::new(snapshot.fraction())
                .text(format!("{} / {}", snapshot.complete, snapshot.total)),
        );
        ui.add_space(8.0);

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for (title, status) in &plugins {
                    ui.horizontal(|ui| {
                        let (marker, color) = status_marker(*status);
                        ui.colored_label(color, marker);
                        ui.label(title);
                    });
                }
            });
    }

    pub(crate) fn draw_install_summary(&mut self, ui: &mut egui::Ui, failed: &[String]) {
        ui.heading("Some plugins failed to install");
        ui.add_space(8.0);
        for name in failed {
            let title = self.wizard().catalog().display_title(name).to_string();
            ui.colored_label(egui::Color32::LIGHT_RED, title);
        }
        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if self.action_button(ui, "Retry") {
                let commands = self.wizard_mut().retry_failed();
                self.run_commands(commands);
            }
            if self.action_button(ui, "Continue") {
                let commands = self.wizard_mut().continue_with_failed();
                self.run_commands(commands);
            }
        });
    }
}

fn status_marker(status: JobStatus) -> (&'static str, egui::Color32) {
    match status {
        JobStatus::Pending => ("..", egui::Color32::GRAY),
        JobStatus::Installing => ("**", egui::Color32::YELLOW),
        JobStatus::Success => ("ok", egui::Color32::LIGHT_GREEN),
        JobStatus::Failure => ("!!", egui::Color32::LIGHT_RED),
    }
}
