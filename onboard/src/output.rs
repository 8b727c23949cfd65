use onboard_client::protocol::{InstallStatusData, RestartStatusData};
use onboard_core::catalog::Catalog;
use onboard_core::install::{InstallProgress, JobStatus, ProgressSnapshot};

pub fn print_info(message: &str) {
    println!("[onboard][INFO] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[onboard][ERROR]: {message}");
}

pub fn print_install_status(status: &InstallStatusData) {
    print_info(&format!("Setup state: {}", status.state));
    if status.jobs.is_empty() {
        print_info("No install jobs");
        return;
    }
    for job in &status.jobs {
        println!("{} {}", job.name, job.install_status);
    }
}

pub fn print_catalog(catalog: &Catalog) {
    if catalog.categories().is_empty() {
        print_info("No curated plugin categories");
        return;
    }
    for category in catalog.categories() {
        print_info(&category.category);
        for entry in &category.plugins {
            let marker = if entry.suggested { "*" } else { " " };
            println!("{marker} {}", entry.name);
        }
    }
}

pub fn print_progress_tick(snapshot: ProgressSnapshot, progress: &InstallProgress) {
    let installing: Vec<&str> = progress
        .plugins()
        .iter()
        .filter(|p| p.status == JobStatus::Installing)
        .map(|p| p.name.as_str())
        .collect();
    println!(
        "{}/{} complete, installing: {}",
        snapshot.complete,
        snapshot.total,
        if installing.is_empty() {
            "-".to_string()
        } else {
            installing.join(", ")
        }
    );
}

pub fn print_restart_status(status: &RestartStatusData) {
    let required = if status.restart_required { "yes" } else { "no" };
    let supported = if status.restart_supported { "yes" } else { "no" };
    print_info(&format!(
        "Restart required: {required}, supported: {supported}"
    ));
}
