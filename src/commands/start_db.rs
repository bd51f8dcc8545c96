//! `stagectl --start-db` - ensure the staging database and its DNS record.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::database::{self, DatabaseOptions};

/// Run `stagectl --start-db`.
///
/// # Errors
///
/// Returns an error if the database launch or the DNS update fails.
pub async fn run(app: &AppContext) -> Result<()> {
    app.output.info("Starting staging database");
    database::ensure_started(
        &app.compute,
        &app.dns,
        &app.reporter(),
        &DatabaseOptions::from_config(&app.config),
    )
    .await
}
