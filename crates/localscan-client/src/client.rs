//! Engine client: one short-lived gRPC channel per call.

use crate::api::{HealthApi, ManagementApi, ScanApi};
use crate::config::ClientConfig;
use crate::proto::{ScanRequest, ShutdownRequest, SingleScanRequest};
use localscan_core::{EngineProfile, LocalScanError, Result, ScanResult};
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::Request;
use tonic_health::pb::health_check_response::ServingStatus;
use tracing::{debug, info};
use uuid::Uuid;

/// Client for a locally running engine
#[derive(Debug, Clone)]
pub struct EngineClient {
    engine: String,
    service_name: String,
    port: u16,
    config: ClientConfig,
}

impl EngineClient {
    /// Create a client for `profile` targeting `port`
    #[must_use]
    pub fn new(profile: &EngineProfile, port: u16) -> Self {
        EngineClientBuilder::new(profile).port(port).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(profile: &EngineProfile) -> EngineClientBuilder {
        EngineClientBuilder::new(profile)
    }

    /// Port subsequent calls connect to; 0 means none configured
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Point subsequent calls at another port
    pub fn configure_port(&mut self, port: u16) {
        debug!(engine = %self.engine, old = self.port, new = port, "configuring engine port");
        self.port = port;
    }

    /// `host:port` of the engine
    #[must_use]
    pub fn address(&self) -> String {
        self.config.address(self.port)
    }

    /// Ask the standard health service whether the engine is serving
    pub async fn health_check(&self) -> Result<()> {
        let timeout = self.config.health_timeout;
        let channel = self.connect(timeout, Some(timeout)).await?;

        let status = HealthApi::new(channel)
            .check(&self.service_name)
            .await
            .map_err(|status| {
                debug!(address = %self.address(), error = %status.message(), "health check failed");
                rpc_error(&status)
            })?;

        if status == ServingStatus::Serving {
            debug!(engine = %self.engine, port = self.port, "engine is serving");
            Ok(())
        } else {
            Err(LocalScanError::NotServing {
                service: self.service_name.clone(),
                status: status.as_str_name().to_string(),
                address: self.address(),
            })
        }
    }

    /// Scan `source_code` under the name `file_name`
    pub async fn scan(&self, file_name: &str, source_code: &str) -> Result<ScanResult> {
        let request_id = Uuid::new_v4().to_string();
        let channel = self
            .connect(self.config.connect_timeout, self.config.scan_timeout)
            .await?;

        let request = Request::new(SingleScanRequest {
            scan_request: Some(ScanRequest {
                id: request_id.clone(),
                file_name: file_name.to_string(),
                source_code: source_code.to_string(),
            }),
        });

        debug!(engine = %self.engine, file = file_name, request_id = %request_id, "sending scan request");
        let response = ScanApi::new(channel)
            .scan(request)
            .await
            .map_err(|status| LocalScanError::Scan {
                engine: self.engine.clone(),
                file_name: file_name.to_string(),
                request_id: request_id.clone(),
                message: status.message().to_string(),
            })?;

        Ok(response.into_inner().into())
    }

    /// Ask the engine to exit
    pub async fn shutdown(&self) -> Result<()> {
        let timeout = self.config.shutdown_timeout;
        let channel = self.connect(timeout, Some(timeout)).await?;

        ManagementApi::new(channel)
            .shutdown(Request::new(ShutdownRequest {}))
            .await
            .map_err(|status| LocalScanError::Shutdown {
                engine: self.engine.clone(),
                message: status.message().to_string(),
            })?;

        info!(engine = %self.engine, port = self.port, "engine is shutting down");
        Ok(())
    }

    async fn connect(&self, connect_timeout: Duration, timeout: Option<Duration>) -> Result<Channel> {
        let address = self.address();
        let connection_error = |message: String| LocalScanError::Connection {
            address: address.clone(),
            message,
        };

        if self.port == 0 {
            return Err(connection_error("no engine port configured".to_string()));
        }

        let mut endpoint = Endpoint::from_shared(format!("http://{address}"))
            .map_err(|e| connection_error(e.to_string()))?
            .connect_timeout(connect_timeout);
        if let Some(timeout) = timeout {
            endpoint = endpoint.timeout(timeout);
        }

        endpoint
            .connect()
            .await
            .map_err(|e| connection_error(e.to_string()))
    }
}

fn rpc_error(status: &tonic::Status) -> LocalScanError {
    LocalScanError::Rpc {
        code: format!("{:?}", status.code()),
        message: status.message().to_string(),
    }
}

/// Builder for configuring an [`EngineClient`]
pub struct EngineClientBuilder {
    engine: String,
    service_name: String,
    port: u16,
    config: ClientConfig,
}

impl EngineClientBuilder {
    /// Create a builder for the given engine profile
    #[must_use]
    pub fn new(profile: &EngineProfile) -> Self {
        Self {
            engine: profile.name.clone(),
            service_name: profile.health_service_name.clone(),
            port: 0,
            config: ClientConfig::default(),
        }
    }

    /// Set the engine port
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the timeouts
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> EngineClient {
        EngineClient {
            engine: self.engine,
            service_name: self.service_name,
            port: self.port,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_stream::wrappers::TcpListenerStream;
    use tonic::transport::Server;
    use tonic_health::ServingStatus as ReportedStatus;

    async fn spawn_health_server(service: &'static str, status: ReportedStatus) -> u16 {
        let (mut reporter, health_service) = tonic_health::server::health_reporter();
        reporter.set_service_status(service, status).await;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let _reporter = reporter;
            Server::builder()
                .add_service(health_service)
                .serve_with_incoming(TcpListenerStream::new(listener))
                .await
                .unwrap();
        });

        port
    }

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    #[tokio::test]
    async fn test_health_check_serving() {
        let profile = EngineProfile::asca();
        let port = spawn_health_server("ScanService", ReportedStatus::Serving).await;
        let client = EngineClient::new(&profile, port);

        tokio_test::assert_ok!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_not_serving() {
        let profile = EngineProfile::asca();
        let port = spawn_health_server("ScanService", ReportedStatus::NotServing).await;
        let client = EngineClient::new(&profile, port);

        let err = client.health_check().await.unwrap_err();
        assert!(matches!(err, LocalScanError::NotServing { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_health_check_unknown_service() {
        let profile = EngineProfile::vorpal();
        let port = spawn_health_server("ScanService", ReportedStatus::Serving).await;
        let client = EngineClient::new(&profile, port);

        let err = client.health_check().await.unwrap_err();
        assert!(matches!(err, LocalScanError::Rpc { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_health_check_nothing_listening() {
        let profile = EngineProfile::asca();
        let client = EngineClient::new(&profile, free_port());

        let err = client.health_check().await.unwrap_err();
        assert!(err.is_transient(), "{err}");
    }

    #[tokio::test]
    async fn test_unconfigured_port_fails_fast() {
        let profile = EngineProfile::asca();
        let client = EngineClient::builder(&profile).build();

        let err = client.scan("a.py", "print(1)").await.unwrap_err();
        assert!(matches!(err, LocalScanError::Connection { .. }), "{err}");
    }

    #[test]
    fn test_configure_port() {
        let profile = EngineProfile::asca();
        let mut client = EngineClient::new(&profile, 1234);
        client.configure_port(5678);
        assert_eq!(client.port(), 5678);
        assert_eq!(client.address(), "127.0.0.1:5678");
    }
}
