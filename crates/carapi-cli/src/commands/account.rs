//! Account and data feed commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use carapi_client::Query;
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::Sdk;
use crate::output::OutputContext;

/// Show API usage, either overall or for today
pub async fn account(sdk: &Sdk, today: bool, query: Query, ctx: &OutputContext) -> Result<()> {
    let usage = match sdk {
        Sdk::Vehicles(c) if today => c.account_requests_today(query).await?,
        Sdk::Vehicles(c) => c.account_requests(query).await?,
        Sdk::Oem(c) => {
            if !query.is_empty() {
                ctx.warn("Query parameters are ignored by the OEM account endpoints");
            }
            if today {
                c.account_requests_today().await?
            } else {
                c.account_requests().await?
            }
        }
        Sdk::Powersports(_) => return Err(sdk.unsupported("account")),
    };
    ctx.print(&usage);
    Ok(())
}

/// Show when the CSV data feed was last regenerated
pub async fn feed_updated(sdk: &Sdk, ctx: &OutputContext) -> Result<()> {
    let updated = match sdk {
        Sdk::Vehicles(c) => c.csv_data_feed_last_updated().await?,
        Sdk::Oem(c) => c.csv_data_feed_last_updated().await?,
        Sdk::Powersports(_) => return Err(sdk.unsupported("feed-updated")),
    };
    ctx.print(&updated);
    Ok(())
}

/// Download the CSV data feed to a file, or stdout when no path is given
pub async fn feed(sdk: &Sdk, output: Option<&Path>, ctx: &OutputContext) -> Result<()> {
    let response = match sdk {
        Sdk::Vehicles(c) => c.csv_data_feed().await?,
        Sdk::Oem(c) => c.csv_data_feed().await?,
        Sdk::Powersports(_) => return Err(sdk.unsupported("feed")),
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Data feed download failed: HTTP {} {}", status.as_u16(), body);
    }

    let written = match output {
        Some(path) => {
            let mut file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let written = copy_body(response, &mut file).await?;
            ctx.success(&format!("Wrote {} bytes to {}", written, path.display()));
            written
        }
        None => copy_body(response, &mut tokio::io::stdout()).await?,
    };

    tracing::debug!(bytes = written, "Data feed downloaded");
    Ok(())
}

async fn copy_body<W>(response: reqwest::Response, out: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Data feed download interrupted")?;
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    out.flush().await?;
    Ok(written)
}
