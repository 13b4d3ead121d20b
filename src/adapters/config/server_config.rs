/// When the update route answers the caller.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AckMode {
    /// Answer with the body length right away and sync in the background.
    Immediate,
    /// Answer once the row has been synced, reporting failures as `500`.
    AfterSync,
}

/// What to do when syncing a received row fails.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncFailurePolicy {
    /// Log the failure and keep serving.
    Log,
    /// Log the failure and terminate the process.
    Exit,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub host: Box<str>,
    pub port: u16,
    pub ack_mode: AckMode,
    pub on_sync_error: SyncFailurePolicy,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
