//! HTTP gateway for the services REST API
//!
//! Every call maps to one request against the configured services resource.
//! Non-2xx responses are turned into [`ClientError::Status`] carrying the status
//! code, the `message` field of the error body when present, and the body itself.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use hostdeck_api::{CreateServiceRequest, ErrorBody, OptionsCatalog, Service, UpdateServiceRequest};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::gateway::{Decoded, ServiceGateway};

/// Where the options document lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionsSource {
    /// Fetched with `GET`
    Url(Url),
    /// Read from the local filesystem
    File(PathBuf),
}

impl OptionsSource {
    /// Interpret a configured value: `http`/`https` URLs are fetched, anything
    /// else is treated as a file path.
    pub fn parse(value: &str) -> Self {
        match Url::parse(value) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Self::Url(url),
            _ => Self::File(PathBuf::from(value)),
        }
    }
}

/// reqwest-backed [`ServiceGateway`]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    options_source: OptionsSource,
}

impl HttpGateway {
    /// Create a new gateway
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::Other(anyhow::anyhow!("Invalid base URL {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Other(anyhow::anyhow!(
                "Base URL cannot carry path segments: {}",
                config.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            options_source: OptionsSource::parse(&config.options_source),
        })
    }

    pub fn options_source(&self) -> &OptionsSource {
        &self.options_source
    }

    /// URL of the collection resource
    fn collection_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
        }
        url
    }

    /// URL of a single service
    fn item_url(&self, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: serde_json::Value =
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        let message = serde_json::from_value::<ErrorBody>(body.clone())
            .ok()
            .and_then(|b| b.message);

        error!("Request failed with status {}: {}", status, body);
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_decoded<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Decoded<T>> {
        let body: serde_json::Value = self.send_json(request).await?;
        Ok(Decoded::from_body(body)?)
    }
}

#[async_trait]
impl ServiceGateway for HttpGateway {
    async fn list_services(&self) -> Result<Vec<Service>> {
        let url = self.collection_url();
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn get_service(&self, id: &str) -> Result<Decoded<Service>> {
        let url = self.item_url(id);
        debug!("GET {}", url);
        self.send_decoded(self.client.get(url)).await
    }

    async fn create_service(&self, request: &CreateServiceRequest) -> Result<Decoded<Service>> {
        let url = self.collection_url();
        debug!("POST {}", url);
        self.send_decoded(self.client.post(url).json(request)).await
    }

    async fn update_service(&self, id: &str, request: &UpdateServiceRequest) -> Result<Service> {
        let url = self.item_url(id);
        debug!("PUT {}", url);
        self.send_json(self.client.put(url).json(request)).await
    }

    async fn delete_service(&self, id: &str) -> Result<u16> {
        let url = self.item_url(id);
        debug!("DELETE {}", url);
        let response = self.send(self.client.delete(url)).await?;
        Ok(response.status().as_u16())
    }

    async fn load_options(&self) -> Result<OptionsCatalog> {
        match &self.options_source {
            OptionsSource::Url(url) => {
                debug!("GET {}", url);
                self.send_json(self.client.get(url.clone())).await
            }
            OptionsSource::File(path) => {
                debug!("Reading options from {}", path.display());
                let bytes = tokio::fs::read(path).await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base_url: &str) -> HttpGateway {
        HttpGateway::new(&ClientConfig::new(base_url)).unwrap()
    }

    #[test]
    fn test_collection_and_item_urls() {
        let gw = gateway("http://localhost:8080/api/services");
        assert_eq!(
            gw.collection_url().as_str(),
            "http://localhost:8080/api/services"
        );
        assert_eq!(
            gw.item_url("abc").as_str(),
            "http://localhost:8080/api/services/abc"
        );
    }

    #[test]
    fn test_trailing_slash_base() {
        let gw = gateway("http://localhost:8080/api/services/");
        assert_eq!(
            gw.collection_url().as_str(),
            "http://localhost:8080/api/services"
        );
        assert_eq!(
            gw.item_url("abc").as_str(),
            "http://localhost:8080/api/services/abc"
        );
    }

    #[test]
    fn test_item_url_escapes_id() {
        let gw = gateway("http://localhost:8080/services");
        assert_eq!(
            gw.item_url("a/b").as_str(),
            "http://localhost:8080/services/a%2Fb"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpGateway::new(&ClientConfig::new("not a url")).is_err());
        assert!(HttpGateway::new(&ClientConfig::new("mailto:ops@example.com")).is_err());
    }

    #[test]
    fn test_options_source_parse() {
        assert!(matches!(
            OptionsSource::parse("https://cdn.example.com/options.json"),
            OptionsSource::Url(_)
        ));
        assert_eq!(
            OptionsSource::parse("data/options.json"),
            OptionsSource::File(PathBuf::from("data/options.json"))
        );
        assert_eq!(
            OptionsSource::parse("/etc/hostdeck/options.json"),
            OptionsSource::File(PathBuf::from("/etc/hostdeck/options.json"))
        );
    }
}
