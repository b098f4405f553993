//! Base URL normalisation and endpoint construction.

use reqwest::Url;
use storefront_core::CredentialPlacement;

use crate::error::ClientError;

use super::CommerceClient;

/// Parses `base_url` and makes sure it ends with exactly one slash so that
/// appended path segments land under it rather than replacing its last
/// segment.
pub(super) fn normalise_base_url(base_url: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }
    Ok(url)
}

impl CommerceClient {
    /// Builds `<base>/<segments...>?<params>` with every segment and value
    /// percent-encoded. Query-placed credentials are appended last.
    pub(super) fn endpoint(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);

        let credentials = match (&self.credentials, self.placement) {
            (Some(credentials), CredentialPlacement::Query) => Some(credentials),
            _ => None,
        };

        if !params.is_empty() || credentials.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            if let Some(credentials) = credentials {
                pairs.append_pair("consumer_key", &credentials.consumer_key);
                pairs.append_pair("consumer_secret", &credentials.consumer_secret);
            }
        }
        Ok(url)
    }
}
