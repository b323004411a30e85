//! `ManagementService` stub.

use crate::proto::{ShutdownRequest, ShutdownResponse};
use http::uri::PathAndQuery;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};

const SHUTDOWN_PATH: &str = "/ManagementService/Shutdown";

/// Management service bound to one channel
pub struct ManagementApi {
    inner: Grpc<Channel>,
}

impl ManagementApi {
    pub(crate) fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    /// Ask the engine process to exit
    pub async fn shutdown(
        &mut self,
        request: Request<ShutdownRequest>,
    ) -> Result<Response<ShutdownResponse>, Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unknown(format!("management service was not ready: {e}")))?;
        let codec: ProstCodec<ShutdownRequest, ShutdownResponse> = ProstCodec::default();
        self.inner
            .unary(request, PathAndQuery::from_static(SHUTDOWN_PATH), codec)
            .await
    }
}
