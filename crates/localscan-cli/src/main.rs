//! localscan - local security engine sidecar CLI
//!
//! Installs, starts and drives a local scanning engine over gRPC.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    localscan_cli::run().await
}
