//! Subcommand execution.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use olp_client::{
    CatalogClient, ClientSettings, DataRequest, LayerDataProvider, PartitionsMetadata,
    PartitionsRequest, QuadKeyPartitionsRequest, ServiceResolver, VersionedLayerClient,
};
use olp_common::{Hrn, QuadKey, ServiceName};

use crate::Command;

/// Run one subcommand, aborting when `cancel` fires.
pub async fn run(command: Command, settings: ClientSettings, cancel: CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => bail!("Cancelled"),
        result = execute(command, settings, &cancel) => result,
    }
}

async fn execute(command: Command, settings: ClientSettings, cancel: &CancellationToken) -> Result<()> {
    match command {
        Command::Lookup {
            service,
            hrn,
            service_version,
        } => {
            let service: ServiceName = service.parse().map_err(anyhow::Error::msg)?;
            let hrn = hrn.as_deref().map(parse_hrn).transpose()?;
            let base_url = ServiceResolver::new(&settings)
                .resolve(service, &service_version, hrn.as_ref(), Some(cancel))
                .await?;
            println!("{}", base_url);
        }
        Command::LatestVersion { hrn } => {
            let client = CatalogClient::new(parse_hrn(&hrn)?, &settings);
            let version = client.latest_version(None, Some(cancel)).await?;
            println!("{}", version);
        }
        Command::Connect {
            hrn,
            layer,
            version,
        } => {
            let hrn = parse_hrn(&hrn)?;
            let connected = LayerDataProvider::new(settings)
                .connect_with_cancel(&hrn, &layer, version, Some(cancel))
                .await?;
            info!(version = connected.version(), "Connected");
            println!("{}", serde_json::to_string_pretty(connected.layer())?);
        }
        Command::Partitions {
            hrn,
            layer,
            ids,
            quad_key,
            depth,
            version,
            billing_tag,
        } => {
            let client = VersionedLayerClient::new(parse_hrn(&hrn)?, layer, settings);
            let metadata = match quad_key {
                Some(tile) => {
                    let request = QuadKeyPartitionsRequest::new(parse_tile(tile)?)
                        .with_version(version)
                        .with_depth(depth)
                        .with_billing_tag(billing_tag);
                    client.get_partitions(request, Some(cancel)).await?
                }
                None => {
                    let request = PartitionsRequest::new()
                        .with_partition_ids(ids)
                        .with_version(version)
                        .with_billing_tag(billing_tag);
                    client.get_partitions(request, Some(cancel)).await?
                }
            };
            let json = match metadata {
                PartitionsMetadata::Index(index) => serde_json::to_string_pretty(&index)?,
                PartitionsMetadata::Partitions(partitions) => {
                    serde_json::to_string_pretty(&partitions)?
                }
            };
            println!("{}", json);
        }
        Command::Get {
            hrn,
            layer,
            data_handle,
            partition_id,
            quad_key,
            depth,
            version,
            billing_tag,
            output,
        } => {
            let mut request = DataRequest::new();
            if let Some(handle) = data_handle {
                request = request.with_data_handle(handle);
            }
            if let Some(id) = partition_id {
                request = request.with_partition_id(id);
            }
            if let Some(tile) = quad_key {
                request = request.with_quad_key(parse_tile(tile)?);
            }
            if let Some(depth) = depth {
                request = request.with_depth(depth);
            }
            if let Some(version) = version {
                request = request.with_version(version);
            }
            if let Some(tag) = billing_tag {
                request = request.with_billing_tag(tag);
            }

            let client = VersionedLayerClient::new(parse_hrn(&hrn)?, layer, settings);
            let response = client.get_data(&request, Some(cancel)).await?;
            let written = match output {
                Some(path) => write_body(response.into_stream(), &mut create(&path).await?).await?,
                None => write_body(response.into_stream(), &mut tokio::io::stdout()).await?,
            };
            info!(bytes = written, "Download complete");
        }
    }
    Ok(())
}

fn parse_hrn(raw: &str) -> Result<Hrn> {
    Hrn::parse(raw).with_context(|| format!("Invalid HRN: {}", raw))
}

fn parse_tile(tile: u64) -> Result<QuadKey> {
    QuadKey::from_here_tile(tile).map_err(|e| anyhow!("Invalid tile {}: {}", tile, e))
}

async fn create(path: &Path) -> Result<tokio::fs::File> {
    tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create: {:?}", path))
}

async fn write_body<W>(mut body: olp_client::transport::ByteStream, out: &mut W) -> Result<u64>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Failed to read payload")?;
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    out.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use olp_client::TransportError;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_parse_tile() {
        assert_eq!(parse_tile(5).unwrap(), QuadKey::new(1, 0, 1).unwrap());
        assert!(parse_tile(0).is_err());
    }

    #[test]
    fn test_parse_hrn_error_names_input() {
        let err = parse_hrn("not-an-hrn").unwrap_err();
        assert!(err.to_string().contains("not-an-hrn"));
    }

    #[tokio::test]
    async fn test_write_body_counts_bytes() {
        let chunks: Vec<Result<Bytes, TransportError>> =
            vec![Ok(Bytes::from("ab")), Ok(Bytes::from("cde"))];
        let stream = futures::stream::iter(chunks).boxed();
        let mut out = Vec::new();
        let written = assert_ok!(write_body(stream, &mut out).await);
        assert_eq!(written, 5);
        assert_eq!(out, b"abcde");
    }

    #[tokio::test]
    async fn test_write_body_stops_on_stream_error() {
        let chunks: Vec<Result<Bytes, TransportError>> = vec![
            Ok(Bytes::from("ab")),
            Err(TransportError::Body("reset".to_string())),
        ];
        let stream = futures::stream::iter(chunks).boxed();
        let mut out = Vec::new();
        assert_err!(write_body(stream, &mut out).await);
        assert_eq!(out, b"ab");
    }
}
