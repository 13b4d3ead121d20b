use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use tracing::{info, instrument};

use crate::adapters::config::sheets_config::{CredentialKind, SpreadsheetConfig};

use super::{
    http_client::{HttpClient, HttpsConnector},
    spreadsheet_manager::SpreadsheetManagerError,
};

/// Builds a non-interactive authenticator from the credential file found in
/// the configured secret directory.
#[instrument(skip_all, fields(kind = ?config.credential_kind))]
pub async fn auth(
    config: &SpreadsheetConfig,
    client: HttpClient,
) -> error_stack::Result<Authenticator<HttpsConnector>, SpreadsheetManagerError> {
    let path = config.credential_path();
    info!("Reading credentials from '{}'", path.display());

    match config.credential_kind {
        CredentialKind::ServiceAccount => {
            let secret = oauth2::read_service_account_key(&path)
                .await
                .change_context(SpreadsheetManagerError::FailedToReadCredentials)
                .attach_printable_lazy(|| {
                    format!(
                        "could not read service account private key at '{}'",
                        path.display()
                    )
                })?;

            oauth2::ServiceAccountAuthenticator::with_client(secret, client)
                .build()
                .await
                .change_context(SpreadsheetManagerError::FailedToAuthenticate)
        }
        CredentialKind::AuthorizedUser => {
            let secret = oauth2::read_authorized_user_secret(&path)
                .await
                .change_context(SpreadsheetManagerError::FailedToReadCredentials)
                .attach_printable_lazy(|| {
                    format!(
                        "could not read authorized user secret at '{}'",
                        path.display()
                    )
                })?;

            oauth2::AuthorizedUserAuthenticator::with_client(secret, client)
                .build()
                .await
                .change_context(SpreadsheetManagerError::FailedToAuthenticate)
        }
    }
}
