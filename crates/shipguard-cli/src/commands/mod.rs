//! CLI command implementations

pub mod recover;

use crate::api::ApiClient;
use crate::error::{CliError, Result};

/// Check that the reconciliation server is reachable
pub async fn status(client: &ApiClient) -> Result<()> {
    if client.health_check().await? {
        println!("server is up");
        Ok(())
    } else {
        Err(CliError::api("server is unreachable"))
    }
}
