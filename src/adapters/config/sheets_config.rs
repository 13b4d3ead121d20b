use std::path::PathBuf;

use crate::domain::sheets::a1_notation::A1Notation;

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Service account private key (non-interactive).
    ServiceAccount,
    /// `authorized_user` secret with a pre-provisioned refresh token.
    AuthorizedUser,
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SheetBackend {
    Google,
    /// Keeps rows in process memory. Nothing reaches Google Sheets.
    Memory,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    pub spreadsheet_id: Box<str>,
    pub range: A1Notation,
    pub secret_dir: PathBuf,
    pub credential_file: Box<str>,
    pub credential_kind: CredentialKind,
    pub backend: SheetBackend,
}

impl SpreadsheetConfig {
    pub fn credential_path(&self) -> PathBuf {
        self.secret_dir.join(self.credential_file.as_ref())
    }
}
