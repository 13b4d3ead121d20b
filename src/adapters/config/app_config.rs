use std::collections::HashMap;

use config::{builder::DefaultState, Config, ConfigBuilder, Environment};
use error_stack::{report, ResultExt};
use thiserror::Error;

use super::{
    server_config::ServerConfig, sheets_config::SpreadsheetConfig,
    telemetry_config::TelemetryConfig,
};

pub const DEFAULT_CONFIG_PATH: &str = "Config";
pub const DEFAULT_RANGE: &str = "Sheet1!A3:H";
const ENV_PREFIX: &str = "SHEET_SYNC";

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sheets: SpreadsheetConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading configuration sources")]
    BuildFailed,
    #[error("Invalid listen address in PORT: '{0}'")]
    InvalidListenAddress(String),
    #[error("Failed to deserialize configuration at field '{field}'")]
    DeserializeFailed { field: String },
}

impl AppConfig {
    /// Loads the configuration from the file named by `CONFIG_PATH` (default
    /// `Config`, any format supported by `config`) and the process environment.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Some(&config_path), std::env::vars().collect())
    }

    /// Precedence, lowest first: built-in defaults, the config file (optional),
    /// `SHEET_SYNC__SECTION__KEY` variables, then `PORT`, `SHEETID` and
    /// `SECRET_DIR`.
    pub fn load_from(
        config_path: Option<&str>,
        vars: HashMap<String, String>,
    ) -> error_stack::Result<Self, ConfigError> {
        let (host, port) = match vars.get("PORT") {
            Some(raw) => parse_listen_address(raw)?,
            None => (None, None),
        };

        let config = builder(config_path, &vars, host, port)
            .and_then(ConfigBuilder::<DefaultState>::build)
            .change_context(ConfigError::BuildFailed)
            .attach_printable_lazy(|| {
                format!(
                    "config file: {}",
                    config_path.unwrap_or("<none>")
                )
            })?;

        serde_path_to_error::deserialize(config).map_err(|err| {
            let field = err.path().to_string();
            report!(ConfigError::DeserializeFailed { field })
                .attach_printable(err.into_inner().to_string())
                .attach_printable(
                    "Make sure all required fields are present in the configuration file or environment.",
                )
        })
    }
}

fn builder(
    config_path: Option<&str>,
    vars: &HashMap<String, String>,
    host: Option<String>,
    port: Option<i64>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    let mut builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080_i64)?
        .set_default("server.ack_mode", "immediate")?
        .set_default("server.on_sync_error", "log")?
        .set_default("sheets.range", DEFAULT_RANGE)?
        .set_default("sheets.secret_dir", ".")?
        .set_default("sheets.credential_file", "credentials.json")?
        .set_default("sheets.credential_kind", "service_account")?
        .set_default("sheets.backend", "google")?;

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }

    builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .source(Some(vars.clone())),
        )
        .set_override_option("server.host", host)?
        .set_override_option("server.port", port)?
        .set_override_option("sheets.spreadsheet_id", vars.get("SHEETID").cloned())?
        .set_override_option("sheets.secret_dir", vars.get("SECRET_DIR").cloned())
}

/// Accepts `8080`, `:8080` or `127.0.0.1:8080`. A blank value means "not set".
fn parse_listen_address(
    raw: &str,
) -> error_stack::Result<(Option<String>, Option<i64>), ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok((None, None));
    }

    let (host, port) = match raw.rsplit_once(':') {
        Some((host, port)) => ((!host.is_empty()).then(|| host.to_owned()), port),
        None => (None, raw),
    };

    let port = port
        .parse::<u16>()
        .change_context_lazy(|| ConfigError::InvalidListenAddress(raw.to_owned()))?;

    Ok((host, Some(i64::from(port))))
}
