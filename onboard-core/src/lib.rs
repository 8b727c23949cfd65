pub mod catalog;
pub mod i18n;
pub mod install;
pub mod wizard;

pub use catalog::{Catalog, CategoryEntry, NeededDependency, Plugin, PluginCategory, Selection};
pub use i18n::Translations;
pub use install::{InstallProgress, InstallingPlugin, JobReport, JobStatus, ProgressSnapshot};
pub use wizard::{Command, Event, Extensions, FormKind, Panel, Wizard, WizardState};
