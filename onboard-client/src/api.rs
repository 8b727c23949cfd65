//! Typed facade over the setup endpoints. Every method goes through the
//! envelope check; none of them retry, re-poll policy lives with the
//! caller.

use crate::http::{encode_query, ClientError, HttpClient};
use crate::protocol::{
    ConnectionStatusData, Envelope, IncompleteStatusData, InstallData, InstallStatusData,
    RestartStatusData, ServerInfoData,
};
use onboard_core::catalog::{Catalog, Plugin, PluginCategory};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

pub const TRANSLATION_BUNDLE: &str = "setup.wizard";
pub const DEFAULT_UPDATE_SITE: &str = "default";

/// Result of a form submission. Field validation failures come back
/// keyed by field name and are shown inline, not as an error panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Accepted,
    Rejected(BTreeMap<String, String>),
}

pub struct SetupApi {
    client: HttpClient,
}

impl SetupApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn load_translations(&self, base_name: &str) -> Result<HashMap<String, String>, ClientError> {
        let envelope: Envelope<HashMap<String, String>> = self.client.get_json(&format!(
            "/i18n/resourceBundle?baseName={}",
            encode_query(base_name)
        ))?;
        envelope.into_result()
    }

    pub fn connection_status(&self, site_id: &str) -> Result<ConnectionStatusData, ClientError> {
        let envelope: Envelope<ConnectionStatusData> = self.client.get_json(&format!(
            "/updateCenter/connectionStatus?siteId={}",
            encode_query(site_id)
        ))?;
        envelope.into_result()
    }

    pub fn platform_plugin_list(&self) -> Result<Vec<PluginCategory>, ClientError> {
        let envelope: Envelope<Vec<PluginCategory>> =
            self.client.get_json("/setupWizard/platformPluginList")?;
        envelope.into_result()
    }

    pub fn available_plugins(&self) -> Result<Vec<Plugin>, ClientError> {
        let envelope: Envelope<Vec<Plugin>> = self.client.get_json("/pluginManager/plugins")?;
        envelope.into_result()
    }

    pub fn search_plugins(&self, query: &str, limit: usize) -> Result<Vec<Plugin>, ClientError> {
        let envelope: Envelope<Vec<Plugin>> = self.client.get_json(&format!(
            "/pluginManager/pluginsSearch?query={}&limit={limit}",
            encode_query(query)
        ))?;
        envelope.into_result()
    }

    /// One catalog fetch: the full plugin listing plus the curated
    /// categories, with dependency closures computed on load.
    pub fn load_catalog(&self) -> Result<Catalog, ClientError> {
        let available = self.available_plugins()?;
        let categories = self.platform_plugin_list()?;
        Ok(Catalog::from_parts(available, categories))
    }

    /// Submits an install batch and returns its correlation id.
    pub fn install(&self, plugins: &[String]) -> Result<String, ClientError> {
        let body = json!({ "dynamicLoad": true, "plugins": plugins });
        let envelope: Envelope<InstallData> =
            self.client.post_json("/pluginManager/installPlugins", &body)?;
        Ok(envelope.into_result()?.correlation_id)
    }

    pub fn install_status(
        &self,
        correlation_id: Option<&str>,
    ) -> Result<InstallStatusData, ClientError> {
        let path = match correlation_id {
            Some(id) => format!("/updateCenter/installStatus?correlationId={}", encode_query(id)),
            None => "/updateCenter/installStatus".to_string(),
        };
        let envelope: Envelope<InstallStatusData> = self.client.get_json(&path)?;
        envelope.into_result()
    }

    pub fn incomplete_install_status(
        &self,
        correlation_id: Option<&str>,
    ) -> Result<IncompleteStatusData, ClientError> {
        let path = match correlation_id {
            Some(id) => format!(
                "/updateCenter/incompleteInstallStatus?correlationId={}",
                encode_query(id)
            ),
            None => "/updateCenter/incompleteInstallStatus".to_string(),
        };
        let envelope: Envelope<IncompleteStatusData> = self.client.get_json(&path)?;
        envelope.into_result()
    }

    pub fn complete_install(&self) -> Result<(), ClientError> {
        let envelope: Envelope<Value> = self
            .client
            .post_json("/setupWizard/completeInstall", &json!({}))?;
        envelope.ack()
    }

    pub fn install_plugins_done(&self) -> Result<(), ClientError> {
        let envelope: Envelope<Value> = self
            .client
            .post_json("/pluginManager/installPluginsDone", &json!({}))?;
        envelope.ack()
    }

    pub fn safe_restart(&self) -> Result<(), ClientError> {
        let envelope: Envelope<Value> =
            self.client.post_json("/updateCenter/safeRestart", &json!({}))?;
        envelope.ack()
    }

    pub fn restart_status(&self) -> Result<RestartStatusData, ClientError> {
        let envelope: Envelope<RestartStatusData> =
            self.client.get_json("/setupWizard/restartStatus")?;
        envelope.into_result()
    }

    /// Whether the instance URL has been configured already.
    pub fn server_configured(&self) -> Result<bool, ClientError> {
        let envelope: Envelope<ServerInfoData> =
            self.client.get_json("/setupWizard/serverUrl")?;
        let info = envelope.into_result()?;
        Ok(info.root_url.map_or(false, |url| !url.is_empty()))
    }

    /// Liveness check used while waiting out a restart.
    pub fn ping(&self) -> bool {
        self.restart_status().is_ok()
    }

    pub fn create_admin_user(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<FormOutcome, ClientError> {
        self.submit_form("/setupWizard/createAdminUser", fields)
    }

    pub fn configure_instance(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<FormOutcome, ClientError> {
        self.submit_form("/setupWizard/configureInstance", fields)
    }

    /// Validation failures come back as a non-"ok" envelope whose data is
    /// the field-keyed error map.
    fn submit_form(
        &self,
        path: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<FormOutcome, ClientError> {
        let body = serde_json::to_value(fields)
            .map_err(|e| ClientError::Malformed(e.to_string()))?;
        let envelope: Envelope<BTreeMap<String, String>> = self.client.post_json(path, &body)?;
        if envelope.status == "ok" {
            return Ok(FormOutcome::Accepted);
        }
        match envelope.data {
            Some(errors) if !errors.is_empty() => Ok(FormOutcome::Rejected(errors)),
            _ => Err(ClientError::Api {
                message: envelope.message.unwrap_or_default(),
            }),
        }
    }
}
