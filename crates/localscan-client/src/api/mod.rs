//! Service stubs, one per gRPC service the engine exposes.

mod health;
mod management;
mod scan;

pub use health::HealthApi;
pub use management::ManagementApi;
pub use scan::ScanApi;
