use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::FormatDescriptor;
use crate::error::RegistryError;

/// Where the supported formats come from.
#[derive(Debug, Clone)]
pub enum FormatSource {
    /// The format service, queried with a single GET.
    Remote {
        url: String,
        token: Option<String>,
        timeout: Duration,
    },
    /// A JSON file with the same shape as the service response.
    File(PathBuf),
}

impl FormatSource {
    /// Fetch the raw descriptors.
    pub async fn fetch(&self) -> Result<Vec<FormatDescriptor>, RegistryError> {
        match self {
            FormatSource::Remote {
                url,
                token,
                timeout,
            } => fetch_remote(url, token.as_deref(), *timeout).await,
            FormatSource::File(path) => {
                let content =
                    tokio::fs::read_to_string(path)
                        .await
                        .map_err(|source| RegistryError::Read {
                            path: path.clone(),
                            source,
                        })?;
                Ok(serde_json::from_str(&content)?)
            }
        }
    }
}

async fn fetch_remote(
    url: &str,
    token: Option<&str>,
    timeout: Duration,
) -> Result<Vec<FormatDescriptor>, RegistryError> {
    let client = Client::builder().timeout(timeout).build()?;

    let mut request = client
        .get(url)
        .header("User-Agent", concat!("resolvr/", env!("CARGO_PKG_VERSION")))
        .header("Accept", "application/json");
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    tracing::debug!(url, "fetching supported formats");
    let response = request.send().await?;

    let status = response.status();
    if status == StatusCode::PAYMENT_REQUIRED {
        return Err(RegistryError::SubscriptionRequired);
    }
    if !status.is_success() {
        return Err(RegistryError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
