use mockito::{Matcher, Server};
use onboard_client::api::{FormOutcome, SetupApi};
use onboard_client::http::{ClientError, HttpClient};
use onboard_core::install::JobStatus;

fn api_for(server: &Server) -> SetupApi {
    SetupApi::new(HttpClient::new(&server.url()))
}

#[test]
fn install_posts_the_selected_plugin_names() {
    let mut server = Server::new();
    let crumb = server
        .mock("GET", "/crumbIssuer/api/json")
        .with_status(404)
        .create();
    let install = server
        .mock("POST", "/pluginManager/installPlugins")
        .match_body(Matcher::Json(serde_json::json!({
            "dynamicLoad": true,
            "plugins": ["subversion"]
        })))
        .with_body(r#"{"status": "ok", "data": {"correlationId": "abc-123"}}"#)
        .create();

    let api = api_for(&server);
    let correlation = api.install(&["subversion".to_string()]).unwrap();
    assert_eq!(correlation, "abc-123");
    crumb.assert();
    install.assert();
}

#[test]
fn posts_carry_the_crumb_header_when_issued() {
    let mut server = Server::new();
    server
        .mock("GET", "/crumbIssuer/api/json")
        .with_body(r#"{"crumbRequestField": "X-Crumb", "crumb": "token-1"}"#)
        .create();
    let done = server
        .mock("POST", "/pluginManager/installPluginsDone")
        .match_header("X-Crumb", "token-1")
        .with_body(r#"{"status": "ok"}"#)
        .create();

    let api = api_for(&server);
    api.install_plugins_done().unwrap();
    done.assert();
}

#[test]
fn non_ok_envelope_is_a_failure_regardless_of_http_status() {
    let mut server = Server::new();
    server
        .mock("GET", "/setupWizard/restartStatus")
        .with_body(r#"{"status": "error", "message": "nope"}"#)
        .create();

    let api = api_for(&server);
    match api.restart_status() {
        Err(ClientError::Api { message }) => assert_eq!(message, "nope"),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[test]
fn http_error_status_maps_to_status_error() {
    let mut server = Server::new();
    server
        .mock("GET", "/setupWizard/restartStatus")
        .with_status(500)
        .create();

    let api = api_for(&server);
    match api.restart_status() {
        Err(ClientError::Status(500)) => {}
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn install_status_classifies_jobs_once() {
    let mut server = Server::new();
    server
        .mock("GET", "/updateCenter/installStatus")
        .match_query(Matcher::UrlEncoded("correlationId".into(), "abc".into()))
        .with_body(
            r#"{"status": "ok", "data": {"state": "INITIAL_PLUGINS_INSTALLING", "jobs": [
                {"name": "git", "installStatus": "Success", "correlationId": "abc"},
                {"name": "scm-api", "installStatus": "Pending"}
            ]}}"#,
        )
        .create();

    let api = api_for(&server);
    let status = api.install_status(Some("abc")).unwrap();
    assert_eq!(status.state, "INITIAL_PLUGINS_INSTALLING");
    let reports: Vec<_> = status.jobs.iter().map(|j| j.to_report()).collect();
    assert_eq!(reports[0].status, Some(JobStatus::Success));
    assert!(reports[0].selected_by_user);
    assert_eq!(reports[1].status, None);
    assert!(!reports[1].selected_by_user);
}

#[test]
fn catalog_load_combines_both_listings() {
    let mut server = Server::new();
    server
        .mock("GET", "/pluginManager/plugins")
        .with_body(
            r#"{"status": "ok", "data": [
                {"name": "git", "title": "Git", "dependencies": {"scm-api": "2.0"}},
                {"name": "scm-api"}
            ]}"#,
        )
        .create();
    server
        .mock("GET", "/setupWizard/platformPluginList")
        .with_body(
            r#"{"status": "ok", "data": [
                {"category": "SCM", "plugins": [{"name": "git", "suggested": true}]}
            ]}"#,
        )
        .create();

    let api = api_for(&server);
    let catalog = api.load_catalog().unwrap();
    assert_eq!(catalog.recommended_plugin_names("en"), vec!["git"]);
    let closure = catalog.all_dependencies_of("git");
    assert!(closure.contains("scm-api"));
}

#[test]
fn form_validation_errors_come_back_keyed_by_field() {
    let mut server = Server::new();
    server
        .mock("GET", "/crumbIssuer/api/json")
        .with_status(404)
        .create();
    server
        .mock("POST", "/setupWizard/createAdminUser")
        .with_body(
            r#"{"status": "fail", "data": {"username": "is required"}}"#,
        )
        .create();

    let api = api_for(&server);
    let mut fields = std::collections::BTreeMap::new();
    fields.insert("fullname".to_string(), "Admin".to_string());
    match api.create_admin_user(&fields).unwrap() {
        FormOutcome::Rejected(errors) => {
            assert_eq!(errors.get("username").map(String::as_str), Some("is required"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn incomplete_status_parses_the_name_map() {
    let mut server = Server::new();
    server
        .mock("GET", "/updateCenter/incompleteInstallStatus")
        .with_body(r#"{"status": "ok", "data": {"git": "Installing", "ant": "Success"}}"#)
        .create();

    let api = api_for(&server);
    let statuses = api.incomplete_install_status(None).unwrap();
    assert_eq!(statuses.get("git").map(String::as_str), Some("Installing"));
    assert_eq!(statuses.len(), 2);
}
