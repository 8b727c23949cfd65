//! Sectioning model for rendered configuration forms.
//!
//! A configuration form arrives as a flat list of rows. Some rows are
//! section headers, some open or close a toggle-controlled row group, the
//! rest are ordinary field rows. This crate groups the rows into logical
//! sections for tabbed navigation, tracks row-group visibility, supports
//! text search with highlight spans, and drives a scrollspy.

use serde::{Deserialize, Serialize};

pub mod scrollspy;
pub mod search;

pub use scrollspy::ScrollSpy;
pub use search::{HighlightSpan, RowHighlights};

/// A toggle control (checkbox/radio) that shows or hides the rows of the
/// enclosing row group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowToggle {
    pub label: String,
    pub checked: bool,
}

/// One `<tr>` of the rendered form, reduced to what sectioning needs.
///
/// `text` is the visible text content of the row; `control_values` carries
/// the current values of form controls in the row, which are deliberately
/// excluded from text search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigRow {
    pub text: String,
    #[serde(default)]
    pub control_values: Vec<String>,
    #[serde(default)]
    pub section_header: bool,
    #[serde(default)]
    pub row_set_start: bool,
    #[serde(default)]
    pub row_set_end: bool,
    /// The buttons row stays visible no matter which section is active.
    #[serde(default)]
    pub buttons: bool,
    #[serde(default)]
    pub toggle: Option<RowToggle>,
    #[serde(default = "default_row_height")]
    pub height: f32,
}

fn default_row_height() -> f32 {
    24.0
}

impl ConfigRow {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn header(title: &str) -> Self {
        Self {
            text: title.to_string(),
            section_header: true,
            ..Self::default()
        }
    }
}

/// A contiguous block of rows whose visibility follows a toggle control.
/// Groups may nest; a row is visible only if every enclosing group's toggle
/// is checked.
#[derive(Debug, Clone, Default)]
pub struct RowGroup {
    pub start_row: usize,
    pub end_row: Option<usize>,
    pub toggle_row: Option<usize>,
    pub rows: Vec<usize>,
    pub children: Vec<RowGroup>,
}

impl RowGroup {
    fn new(start_row: usize) -> Self {
        Self {
            start_row,
            ..Self::default()
        }
    }

    pub fn label<'a>(&self, table: &'a ConfigTable) -> Option<&'a str> {
        let toggle_row = self.toggle_row?;
        let toggle = table.rows.get(toggle_row)?.toggle.as_ref()?;
        Some(toggle.label.as_str())
    }

    /// All row indices governed by this group, nested groups included.
    pub fn member_rows(&self) -> Vec<usize> {
        let mut members = self.rows.clone();
        for child in &self.children {
            members.push(child.start_row);
            if let Some(toggle_row) = child.toggle_row {
                members.push(toggle_row);
            }
            if let Some(end_row) = child.end_row {
                members.push(end_row);
            }
            members.extend(child.member_rows());
        }
        members
    }
}

/// A logical section of the form: one header row plus every row up to the
/// next header. The leading rows of a form without an explicit first header
/// become an implicit "General" section.
#[derive(Debug, Clone, Default)]
pub struct ConfigSection {
    pub title: String,
    pub id: String,
    pub header_row: Option<usize>,
    pub rows: Vec<usize>,
    pub groups: Vec<RowGroup>,
}

impl ConfigSection {
    fn new(title: &str, header_row: Option<usize>) -> Self {
        Self {
            title: title.to_string(),
            id: to_id(title),
            header_row,
            rows: Vec::new(),
            groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigTable {
    pub rows: Vec<ConfigRow>,
    pub sections: Vec<ConfigSection>,
    active: Option<usize>,
}

/// Normalized section id: `config_` plus the title with runs of
/// non-alphanumeric characters collapsed to single underscores.
pub fn to_id(title: &str) -> String {
    let mut id = String::from("config_");
    let mut last_sep = true;
    for ch in title.trim().chars() {
        if ch.is_alphanumeric() {
            id.extend(ch.to_lowercase());
            last_sep = false;
        } else if !last_sep {
            id.push('_');
            last_sep = true;
        }
    }
    if id.ends_with('_') {
        id.pop();
    }
    id
}

impl ConfigTable {
    /// Groups a flat row list into sections and row groups.
    pub fn from_rows(rows: Vec<ConfigRow>) -> Self {
        let mut sections: Vec<ConfigSection> = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            if row.buttons {
                continue;
            }
            if row.section_header {
                // Accumulated header text sometimes keeps the leading
                // anchor hash; drop it from the title.
                let title = row.text.trim().trim_start_matches('#').trim();
                sections.push(ConfigSection::new(title, Some(idx)));
                continue;
            }
            if sections.is_empty() {
                sections.push(ConfigSection::new("General", None));
            }
            if let Some(section) = sections.last_mut() {
                section.rows.push(idx);
            }
        }

        for section in &mut sections {
            section.groups = gather_row_groups(&rows, &section.rows);
        }

        Self {
            rows,
            sections,
            active: None,
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn has_sections(&self) -> bool {
        let has_sections = self.section_count() > 0;
        if !has_sections {
            log::warn!("configuration form without sections");
        }
        has_sections
    }

    pub fn section_ids(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }

    pub fn section(&self, section_id: &str) -> Option<&ConfigSection> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn active_section(&self) -> Option<&ConfigSection> {
        self.active.and_then(|idx| self.sections.get(idx))
    }

    /// Activates the section with the given id; the previously active
    /// section is deactivated. Returns false for an unknown id.
    pub fn activate(&mut self, section_id: &str) -> bool {
        match self.sections.iter().position(|s| s.id == section_id) {
            Some(idx) => {
                self.active = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn activate_first(&mut self) {
        if self.has_sections() {
            self.active = Some(0);
        }
    }

    pub fn deactivate(&mut self) {
        self.active = None;
    }

    /// Flips a row-group toggle in place.
    pub fn set_toggle(&mut self, row: usize, checked: bool) {
        if let Some(toggle) = self.rows.get_mut(row).and_then(|r| r.toggle.as_mut()) {
            toggle.checked = checked;
        }
    }

    /// Row indices currently rendered: the active section's rows minus the
    /// rows of unchecked groups, plus the buttons row, which always shows.
    /// Section header rows are not rendered while tabbed; the tab label
    /// stands in for them.
    pub fn visible_rows(&self) -> Vec<usize> {
        let mut visible = Vec::new();
        if let Some(section) = self.active_section() {
            let hidden = self.hidden_group_rows(section);
            for &idx in &section.rows {
                if !hidden.contains(&idx) {
                    visible.push(idx);
                }
            }
        }
        for (idx, row) in self.rows.iter().enumerate() {
            if row.buttons {
                visible.push(idx);
            }
        }
        visible
    }

    fn hidden_group_rows(&self, section: &ConfigSection) -> Vec<usize> {
        let mut hidden = Vec::new();
        for group in &section.groups {
            self.collect_hidden(group, false, &mut hidden);
        }
        hidden
    }

    fn collect_hidden(&self, group: &RowGroup, parent_hidden: bool, hidden: &mut Vec<usize>) {
        let unchecked = group
            .toggle_row
            .and_then(|idx| self.rows.get(idx))
            .and_then(|row| row.toggle.as_ref())
            .map(|toggle| !toggle.checked)
            .unwrap_or(false);
        let hide = parent_hidden || unchecked;
        if hide {
            hidden.extend(group.rows.iter().copied());
        }
        for child in &group.children {
            if hide {
                hidden.push(child.start_row);
                if let Some(idx) = child.toggle_row {
                    hidden.push(idx);
                }
                if let Some(idx) = child.end_row {
                    hidden.push(idx);
                }
            }
            self.collect_hidden(child, hide, hidden);
        }
    }

    /// Filters the section tabs by text. An empty filter shows every
    /// section (activating the first if none is active); otherwise only
    /// sections containing the text stay visible and the first match is
    /// activated. Returns the ids of the sections left visible.
    pub fn show_sections(&mut self, with_text: &str) -> Vec<String> {
        if !self.has_sections() {
            return Vec::new();
        }
        if with_text.is_empty() {
            if self.active.is_none() {
                self.activate_first();
            }
            return self.section_ids();
        }

        let matching: Vec<String> = self
            .sections
            .iter()
            .filter(|section| search::section_has_text(self, section, with_text))
            .map(|section| section.id.clone())
            .collect();
        match matching.first() {
            Some(first) => {
                let first = first.clone();
                self.activate(&first);
            }
            None => self.deactivate(),
        }
        matching
    }
}

/// Collects toggle-controlled row groups inside one section, tracking
/// nesting through a start/end stack. Groups without a matching end marker
/// are discarded.
fn gather_row_groups(rows: &[ConfigRow], section_rows: &[usize]) -> Vec<RowGroup> {
    let mut groups = Vec::new();
    let mut stack: Vec<RowGroup> = Vec::new();

    for &idx in section_rows {
        let row = &rows[idx];
        if row.row_set_start {
            let mut group = RowGroup::new(idx);
            if row.toggle.is_some() {
                group.toggle_row = Some(idx);
            }
            stack.push(group);
        } else if row.row_set_end {
            if let Some(mut group) = stack.pop() {
                group.end_row = Some(idx);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(group),
                    None => groups.push(group),
                }
            }
        } else if let Some(group) = stack.last_mut() {
            if group.toggle_row.is_none() && row.toggle.is_some() {
                group.toggle_row = Some(idx);
            } else {
                group.rows.push(idx);
            }
        }
    }

    groups
}
