//! Resolution of a [`ConfigSource`] into an ordered endpoint list

use crate::{
    config::{document::parse_document, presets},
    error::{AppError, Result},
    logging::Logger,
    models::EndpointDescriptor,
    types::ConfigSource,
};
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};

/// Turns a config source into endpoint descriptors.
///
/// Each call performs at most one filesystem or network read.
pub struct ConfigResolver {
    http: Client,
    logger: Logger,
}

impl ConfigResolver {
    /// Create a resolver whose remote fetches are bounded by `fetch_timeout`
    pub fn new(fetch_timeout: Duration, logger: Logger) -> Result<Self> {
        let http = Client::builder()
            .timeout(fetch_timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, logger })
    }

    /// Resolve the source. Never returns an empty list.
    pub async fn resolve(&self, source: &ConfigSource) -> Result<Vec<EndpointDescriptor>> {
        let started = Instant::now();

        let endpoints = match source {
            ConfigSource::Preset(network) => presets::endpoints(*network).to_vec(),
            ConfigSource::LocalPath(path) => parse_document(&self.read_local(path).await?)?,
            ConfigSource::RemoteUrl(url) => parse_document(&self.fetch_remote(url).await?)?,
        };

        if endpoints.is_empty() {
            return Err(AppError::config_parse(format!("{} lists no lite-servers", source.describe())));
        }

        self.logger
            .info(&format!("Resolved {} lite-servers from {}", endpoints.len(), source.describe()))
            .field("source", source.describe())
            .field("endpoints", endpoints.len())
            .field("duration_ms", started.elapsed().as_millis() as u64)
            .log()
            .await;

        Ok(endpoints)
    }

    async fn read_local(&self, path: &str) -> Result<String> {
        if !Path::new(path).exists() {
            return Err(AppError::config_not_found(path));
        }

        self.logger
            .debug(&format!("Reading config document {}", path))
            .field("path", path)
            .log()
            .await;

        tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::config_not_found(path),
            std::io::ErrorKind::InvalidData => AppError::config_parse(format!("{} is not valid UTF-8", path)),
            _ => AppError::io(format!("Failed to read {}: {}", path, e)),
        })
    }

    async fn fetch_remote(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|e| AppError::config_fetch(url, e.to_string()))?;

        self.logger
            .debug(&format!("GET {}", parsed))
            .field("url", url)
            .log()
            .await;

        let response = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| AppError::config_fetch(url, describe_request_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::config_fetch(url, format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::config_fetch(url, format!("failed to read body: {}", e)))
    }
}

fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NetworkPreset;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const DOCUMENT: &str = r#"{"liteservers": [
        {"ip": 2130706433, "port": 4924, "id": {"@type": "pub.ed25519", "key": "n4VDnSCUuSpjnCyUk9e3QOOd6o0ItSWYbTnW3Wnn8wk="}},
        {"ip": 2130706433, "port": 4925, "id": {"@type": "pub.ed25519", "key": "n4VDnSCUuSpjnCyUk9e3QOOd6o0ItSWYbTnW3Wnn8wk="}}
    ]}"#;

    fn resolver() -> ConfigResolver {
        ConfigResolver::new(Duration::from_secs(5), Logger::quiet("test")).unwrap()
    }

    #[tokio::test]
    async fn test_preset_resolution() {
        let endpoints = resolver()
            .resolve(&ConfigSource::Preset(NetworkPreset::Testnet))
            .await
            .unwrap();
        assert_eq!(endpoints, presets::endpoints(NetworkPreset::Testnet));
    }

    #[tokio::test]
    async fn test_local_file_resolution() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let source = ConfigSource::LocalPath(file.path().to_string_lossy().into_owned());
        let endpoints = resolver().resolve(&source).await.unwrap();

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].address(), "127.0.0.1:4924");
        assert_eq!(endpoints[1].address(), "127.0.0.1:4925");
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let source = ConfigSource::LocalPath("./missing.json".to_string());
        let err = resolver().resolve(&source).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigNotFound { ref path } if path == "./missing.json"));
    }

    #[tokio::test]
    async fn test_non_utf8_local_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"liteservers\": [\xff\xfe]}").unwrap();

        let source = ConfigSource::LocalPath(file.path().to_string_lossy().into_owned());
        let err = resolver().resolve(&source).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(ref msg) if msg.contains("not valid UTF-8")));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_malformed_local_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"liteservers\": [").unwrap();

        let source = ConfigSource::LocalPath(file.path().to_string_lossy().into_owned());
        let err = resolver().resolve(&source).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(_)));
    }

    #[tokio::test]
    async fn test_remote_resolution() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/global.config.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOCUMENT))
            .expect(1)
            .mount(&server)
            .await;

        let source = ConfigSource::RemoteUrl(format!("{}/global.config.json", server.uri()));
        let endpoints = resolver().resolve(&source).await.unwrap();
        assert_eq!(endpoints.len(), 2);
    }

    #[tokio::test]
    async fn test_remote_not_found_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/config.json", server.uri());
        let err = resolver()
            .resolve(&ConfigSource::RemoteUrl(url.clone()))
            .await
            .unwrap_err();

        match err {
            AppError::ConfigFetch { url: failed, reason } => {
                assert_eq!(failed, url);
                assert!(reason.contains("404"));
            }
            other => panic!("expected ConfigFetch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let source = ConfigSource::RemoteUrl(format!("{}/config.json", server.uri()));
        let err = resolver().resolve(&source).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(_)));
    }

    #[tokio::test]
    async fn test_remote_timeout_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(DOCUMENT)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let resolver = ConfigResolver::new(Duration::from_millis(200), Logger::quiet("test")).unwrap();
        let source = ConfigSource::RemoteUrl(format!("{}/config.json", server.uri()));
        let err = resolver.resolve(&source).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigFetch { .. }));
    }
}
