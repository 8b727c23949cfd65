use mockito::Server;
use onboard_client::api::SetupApi;
use onboard_client::http::HttpClient;
use onboard_client::poller::poll_until_complete;
use onboard_core::catalog::{Catalog, Plugin};
use onboard_core::install::InstallProgress;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

fn catalog() -> Catalog {
    Catalog::from_parts(
        vec![Plugin {
            name: "git".to_string(),
            title: "Git".to_string(),
            excerpt: None,
            dependencies: BTreeMap::new(),
            needed_dependencies: Vec::new(),
        }],
        vec![],
    )
}

fn tracking(names: &[&str]) -> InstallProgress {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    InstallProgress::from_selection(&catalog(), &names)
}

#[test]
fn returns_once_every_job_is_terminal() {
    let mut server = Server::new();
    server
        .mock("GET", "/updateCenter/installStatus")
        .with_body(
            r#"{"status": "ok", "data": {"state": "RUNNING", "jobs": [
                {"name": "git", "installStatus": "Success", "correlationId": "abc"}
            ]}}"#,
        )
        .create();

    let api = SetupApi::new(HttpClient::new(&server.url()));
    let mut progress = tracking(&["git"]);
    let mut ticks = 0;
    let failed = poll_until_complete(&api, None, &mut progress, |snapshot, _| {
        ticks += 1;
        assert_eq!(snapshot.complete, 1);
    })
    .unwrap();
    assert!(failed.is_empty());
    assert_eq!(ticks, 1);
}

#[test]
fn failed_jobs_come_back_by_name() {
    let mut server = Server::new();
    server
        .mock("GET", "/updateCenter/installStatus")
        .with_body(
            r#"{"status": "ok", "data": {"state": "RUNNING", "jobs": [
                {"name": "git", "installStatus": "Failure", "correlationId": "abc"}
            ]}}"#,
        )
        .create();

    let api = SetupApi::new(HttpClient::new(&server.url()));
    let mut progress = tracking(&["git"]);
    let failed = poll_until_complete(&api, None, &mut progress, |_, _| {}).unwrap();
    assert_eq!(failed, vec!["git".to_string()]);
}

#[test]
fn keeps_polling_while_the_server_reports_installing() {
    let mut server = Server::new();
    let installing = server
        .mock("GET", "/updateCenter/installStatus")
        .with_body(
            r#"{"status": "ok", "data": {"state": "INITIAL_PLUGINS_INSTALLING", "jobs": [
                {"name": "git", "installStatus": "Installing", "correlationId": "abc"}
            ]}}"#,
        )
        .expect_at_least(1)
        .create();

    let url = server.url();
    let handle = thread::spawn(move || {
        let api = SetupApi::new(HttpClient::new(&url));
        let mut progress = tracking(&["git"]);
        let mut ticks = 0;
        let failed = poll_until_complete(&api, None, &mut progress, |_, _| ticks += 1);
        (failed, ticks)
    });

    // Let at least two poll cycles see the installing response, then flip
    // the server to the finished state.
    thread::sleep(Duration::from_millis(600));
    server
        .mock("GET", "/updateCenter/installStatus")
        .with_body(
            r#"{"status": "ok", "data": {"state": "RUNNING", "jobs": [
                {"name": "git", "installStatus": "Success", "correlationId": "abc"}
            ]}}"#,
        )
        .create();
    installing.remove();

    let (failed, ticks) = handle.join().unwrap();
    assert_eq!(failed.unwrap(), Vec::<String>::new());
    assert!(ticks >= 2);
}
