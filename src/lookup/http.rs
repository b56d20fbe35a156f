//! Domain lookup against an org directory service.
//!
//! `GET {url}/{domain}` answers `{"tenant": "slug"}` for a mapped domain and
//! 404 for an unmapped one. Anything else is an error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::lookup::{DomainLookup, LookupError};
use crate::routing::tenant::TenantId;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    tenant: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpDomainLookup {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpDomainLookup {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let base = Url::parse(url).map_err(|_| LookupError::BaseUrl(url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(LookupError::BaseUrl(url.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    fn url_for(&self, domain: &str) -> Result<Url, LookupError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(domain);
        Ok(url)
    }
}

#[async_trait]
impl DomainLookup for HttpDomainLookup {
    async fn lookup(&self, domain: &str) -> Result<Option<TenantId>, LookupError> {
        let url = self.url_for(&domain.to_lowercase())?;
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout(self.timeout)
            } else {
                LookupError::Transport(e)
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: LookupResponse = response.json().await?;
                Ok(body.tenant.as_deref().and_then(TenantId::new))
            }
            status => Err(LookupError::Status(status.as_u16())),
        }
    }
}
