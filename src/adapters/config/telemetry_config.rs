use std::path::PathBuf;

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Max level for this crate's targets (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: Box<str>,
    pub log_file: Option<PathBuf>,
    /// OTLP gRPC collector, e.g. `http://localhost:4317`.
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            level: "info".into(),
            log_file: None,
            otlp_endpoint: None,
        }
    }
}
