//! Auth command - obtain a JWT, and the login step shared by every command

use anyhow::{Context, Result};
use carapi_client::DEFAULT_EXPIRY_BUFFER_SECS;
use tracing::debug;

use super::Sdk;
use crate::output::OutputContext;

/// Log in and print the JWT with its expiry
pub async fn auth(sdk: &mut Sdk, ctx: &OutputContext) -> Result<()> {
    let jwt = sdk
        .client_mut()
        .authenticate()
        .await
        .context("Authentication failed")?;
    ctx.success("Authenticated");

    let expires = sdk
        .client()
        .session()
        .jwt_expires_at()
        .context("Failed to read JWT expiry")?
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());

    ctx.print_kv(&[("JWT", jwt), ("Expires", expires)]);
    Ok(())
}

/// Make sure the client holds a usable JWT
///
/// A supplied token is used as long as it has not expired; otherwise the
/// configured token and secret are exchanged for a new one.
pub async fn ensure_jwt(sdk: &mut Sdk, supplied: Option<&str>, ctx: &OutputContext) -> Result<()> {
    if let Some(jwt) = supplied {
        let client = sdk.client_mut();
        client.session_mut().load_jwt(jwt);
        match client.is_jwt_expired(DEFAULT_EXPIRY_BUFFER_SECS) {
            Ok(Some(false)) => {
                debug!("Using supplied JWT");
                return Ok(());
            }
            Ok(_) => ctx.warn("Supplied JWT has expired, logging in again"),
            Err(e) => ctx.warn(&format!("Supplied JWT is unusable ({}), logging in again", e)),
        }
    }

    sdk.client_mut()
        .authenticate()
        .await
        .context("Authentication failed")?;
    Ok(())
}
