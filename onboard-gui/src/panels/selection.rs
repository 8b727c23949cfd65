use crate::WizardApp;
use eframe::egui;
use onboard_core::catalog::Plugin;

impl WizardApp {
    pub(crate) fn draw_selection(&mut self, ui: &mut egui::Ui) {
        ui.heading("Plugins");
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label("Find:");
            ui.text_edit_singleline(&mut self.selection_view.query);
            ui.checkbox(&mut self.selection_view.only_selected, "Selected only");
            ui.separator();
            if ui.button("All").clicked() {
                self.wizard_mut().select_all();
            }
            if ui.button("None").clicked() {
                self.wizard_mut().select_none();
            }
            if ui.button("Suggested").clicked() {
                self.wizard_mut().select_recommended_only();
            }
        });
        ui.separator();

        let categories: Vec<(String, Vec<String>)> = self
            .wizard()
            .catalog()
            .categories()
            .iter()
            .map(|c| {
                (
                    c.category.clone(),
                    c.plugins.iter().map(|p| p.name.clone()).collect(),
                )
            })
            .collect();

        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 48.0)
            .show(ui, |ui| {
                for (category, names) in &categories {
                    let visible: Vec<&String> =
                        names.iter().filter(|n| self.row_visible(n)).collect();
                    if visible.is_empty() {
                        continue;
                    }
                    let selected = names
                        .iter()
                        .filter(|n| self.wizard().selection().contains(n))
                        .count();
                    ui.strong(format!("{category} ({selected}/{})", names.len()));
                    for name in visible {
                        self.draw_plugin_row(ui, name);
                    }
                    ui.add_space(6.0);
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            let count = self.wizard().selection().len();
            let label = if count == 1 {
                "1 plugin selected".to_string()
            } else {
                format!("{count} plugins selected")
            };
            ui.label(label);
            if self.action_button(ui, "Install") {
                let commands = self.wizard_mut().install_selected();
                self.run_commands(commands);
            }
            if ui.link("Skip").clicked() {
                let commands = self.wizard_mut().skip_plugins();
                self.run_commands(commands);
            }
        });
    }

    /// Case-insensitive substring filter over name, title and excerpt,
    /// combined with the selected-only toggle.
    fn row_visible(&self, name: &str) -> bool {
        if self.selection_view.only_selected && !self.wizard().selection().contains(name) {
            return false;
        }
        let query = self.selection_view.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let catalog = self.wizard().catalog();
        if name.to_lowercase().contains(&query) {
            return true;
        }
        match catalog.plugin(name) {
            Some(plugin) => {
                plugin.title.to_lowercase().contains(&query)
                    || plugin
                        .excerpt
                        .as_deref()
                        .map_or(false, |e| e.to_lowercase().contains(&query))
            }
            None => false,
        }
    }

    fn draw_plugin_row(&mut self, ui: &mut egui::Ui, name: &str) {
        let plugin: Option<Plugin> = self.wizard().catalog().plugin(name).cloned();
        let title = self.wizard().catalog().display_title(name).to_string();
        let mut checked = self.wizard().selection().contains(name);

        ui.horizontal(|ui| {
            if ui.checkbox(&mut checked, &title).changed() {
                self.wizard_mut().toggle_plugin(name);
            }
            let dep_count = self
                .wizard()
                .catalog()
                .all_dependencies_of(name)
                .len()
                .saturating_sub(1);
            if dep_count > 0 {
                let unfolded = self.selection_view.unfolded.contains(name);
                let marker = if unfolded {
                    format!("Hide {dep_count} dependencies")
                } else {
                    format!("Show {dep_count} dependencies")
                };
                if ui.small_button(marker).clicked() {
                    if unfolded {
                        self.selection_view.unfolded.remove(name);
                    } else {
                        self.selection_view.unfolded.insert(name.to_string());
                    }
                }
            }
        });
        if let Some(excerpt) = plugin.as_ref().and_then(|p| p.excerpt.as_deref()) {
            ui.weak(excerpt);
        }
        if self.selection_view.unfolded.contains(name) {
            let deps = self.wizard().catalog().all_dependencies_of(name);
            ui.indent(name, |ui| {
                for dep in deps.iter().filter(|d| d.as_str() != name) {
                    ui.weak(dep);
                }
            });
        }
    }
}
