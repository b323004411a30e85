//! `ScanService` stub.

use crate::proto::{ScanResult, SingleScanRequest};
use http::uri::PathAndQuery;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};

const SCAN_PATH: &str = "/ScanService/Scan";

/// Scan service bound to one channel
pub struct ScanApi {
    inner: Grpc<Channel>,
}

impl ScanApi {
    pub(crate) fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    /// Scan a single file
    pub async fn scan(
        &mut self,
        request: Request<SingleScanRequest>,
    ) -> Result<Response<ScanResult>, Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unknown(format!("scan service was not ready: {e}")))?;
        let codec: ProstCodec<SingleScanRequest, ScanResult> = ProstCodec::default();
        self.inner
            .unary(request, PathAndQuery::from_static(SCAN_PATH), codec)
            .await
    }
}
