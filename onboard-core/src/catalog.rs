//! Plugin catalog: the installable plugin set with dependency metadata,
//! the curated category listing, and the user's current selection.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// One entry of a plugin's `neededDependencies` list as reported by the
/// server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeededDependency {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// An installable plugin as listed by the plugin manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Declared dependencies as a name to version-constraint map.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Dependencies the server resolved as still needing installation.
    #[serde(default)]
    pub needed_dependencies: Vec<NeededDependency>,
}

/// One plugin reference inside a curated category. Fields here override
/// the catalog entry's title/excerpt when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub suggested: bool,
}

/// Grouping metadata from the curated installer catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginCategory {
    pub category: String,
    pub plugins: Vec<CategoryEntry>,
}

/// The loaded catalog. Dependency closures are computed once per load and
/// are immutable for the rest of the session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    plugins: BTreeMap<String, Plugin>,
    categories: Vec<PluginCategory>,
    all_names: Vec<String>,
    closures: BTreeMap<String, BTreeSet<String>>,
}

impl Catalog {
    /// Builds the catalog from the available-plugins listing plus the
    /// curated categories, computing every dependency closure up front.
    pub fn from_parts(available: Vec<Plugin>, categories: Vec<PluginCategory>) -> Self {
        let mut plugins = BTreeMap::new();
        for mut plugin in available {
            if plugin.title.is_empty() {
                plugin.title = plugin.name.clone();
            }
            plugins.insert(plugin.name.clone(), plugin);
        }

        // Catalog order is the curated category order, names de-duplicated
        // across categories.
        let mut all_names = Vec::new();
        let mut seen = HashSet::new();
        for category in &categories {
            for entry in &category.plugins {
                if seen.insert(entry.name.clone()) {
                    all_names.push(entry.name.clone());
                }
            }
        }

        let mut closures = BTreeMap::new();
        for name in plugins.keys() {
            let mut closure = BTreeSet::new();
            collect_dependencies(&plugins, name, &mut closure);
            closures.insert(name.clone(), closure);
        }

        Self {
            plugins,
            categories,
            all_names,
            closures,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty() && self.categories.is_empty()
    }

    pub fn plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    pub fn categories(&self) -> &[PluginCategory] {
        &self.categories
    }

    /// Every catalog plugin name, in curated catalog order.
    pub fn all_names(&self) -> &[String] {
        &self.all_names
    }

    /// Transitive dependency closure of a plugin, itself included. Stable
    /// for a given catalog regardless of declaration order; an unknown
    /// name resolves to just itself.
    pub fn all_dependencies_of(&self, name: &str) -> BTreeSet<String> {
        match self.closures.get(name) {
            Some(closure) => closure.clone(),
            None => {
                let mut closure = BTreeSet::new();
                collect_dependencies(&self.plugins, name, &mut closure);
                closure
            }
        }
    }

    /// Display title for a plugin name, falling back to the name.
    pub fn display_title<'a>(&'a self, name: &'a str) -> &'a str {
        match self.plugins.get(name) {
            Some(plugin) if !plugin.title.is_empty() => &plugin.title,
            _ => name,
        }
    }

    /// The recommended set: every category entry marked `suggested`, plus
    /// a localization plugin matching the given locale when the catalog
    /// carries one. Names are de-duplicated across categories.
    pub fn recommended_plugin_names(&self, locale: &str) -> Vec<String> {
        let mut recommended = Vec::new();
        let mut seen = HashSet::new();
        for category in &self.categories {
            for entry in &category.plugins {
                if entry.suggested && seen.insert(entry.name.clone()) {
                    recommended.push(entry.name.clone());
                }
            }
        }
        if let Some(name) = self.localization_plugin(locale) {
            if seen.insert(name.clone()) {
                recommended.push(name);
            }
        }
        recommended
    }

    /// `localization-<locale>` for the full locale first, then for the
    /// bare language subtag.
    fn localization_plugin(&self, locale: &str) -> Option<String> {
        let normalized = locale.trim().to_lowercase().replace('_', "-");
        if normalized.is_empty() {
            return None;
        }
        let full = format!("localization-{normalized}");
        if self.plugins.contains_key(&full) {
            return Some(full);
        }
        let language = normalized.split('-').next().unwrap_or(&normalized);
        let short = format!("localization-{language}");
        if self.plugins.contains_key(&short) {
            return Some(short);
        }
        None
    }
}

/// Depth-first walk over both dependency relations. The visited set doubles
/// as the result and guards against cycles and duplicate declarations in
/// malformed catalog data.
fn collect_dependencies(
    plugins: &BTreeMap<String, Plugin>,
    name: &str,
    visited: &mut BTreeSet<String>,
) {
    if !visited.insert(name.to_string()) {
        return;
    }
    let Some(plugin) = plugins.get(name) else {
        return;
    };
    for dep in plugin.dependencies.keys() {
        collect_dependencies(plugins, dep, visited);
    }
    for dep in &plugin.needed_dependencies {
        collect_dependencies(plugins, &dep.name, visited);
    }
}

/// The user's current installation choice. Order-insensitive; rendering in
/// catalog order is derived on demand.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    names: HashSet<String>,
}

impl Selection {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    pub fn remove(&mut self, name: &str) {
        self.names.remove(name);
    }

    pub fn toggle(&mut self, name: &str) {
        if !self.names.remove(name) {
            self.names.insert(name.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Selected names ordered the way the catalog lists them; names the
    /// catalog does not know come last in lexical order.
    pub fn in_catalog_order(&self, catalog: &Catalog) -> Vec<String> {
        let mut ordered: Vec<String> = catalog
            .all_names()
            .iter()
            .filter(|name| self.names.contains(name.as_str()))
            .cloned()
            .collect();
        let mut extra: Vec<String> = self
            .names
            .iter()
            .filter(|name| !catalog.all_names().contains(name))
            .cloned()
            .collect();
        extra.sort();
        ordered.extend(extra);
        ordered
    }
}
