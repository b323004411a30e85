//! Standard `grpc.health.v1.Health` stub.

use tonic::transport::Channel;
use tonic::Status;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

/// Health service bound to one channel
pub struct HealthApi {
    inner: HealthClient<Channel>,
}

impl HealthApi {
    pub(crate) fn new(channel: Channel) -> Self {
        Self {
            inner: HealthClient::new(channel),
        }
    }

    /// Serving status of the named service
    pub async fn check(&mut self, service: &str) -> Result<ServingStatus, Status> {
        let request = HealthCheckRequest {
            service: service.to_string(),
        };
        let response = self.inner.check(request).await?;
        Ok(response.into_inner().status())
    }
}
