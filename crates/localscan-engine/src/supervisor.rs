//! Detached launch of the engine process and readiness polling.

use localscan_core::{LocalScanError, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Launch and readiness settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// How long to wait for the engine to accept connections
    pub ready_timeout: Duration,
    /// Delay between connection attempts
    pub poll_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl SupervisorConfig {
    /// Set the readiness deadline
    #[must_use]
    pub const fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Starts engines that outlive this process
#[derive(Debug, Clone, Default)]
pub struct ProcessSupervisor {
    config: SupervisorConfig,
}

impl ProcessSupervisor {
    /// Supervisor with the given settings
    #[must_use]
    pub const fn new(config: SupervisorConfig) -> Self {
        Self { config }
    }

    /// Current settings
    #[must_use]
    pub const fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Start `<executable> -listen <port>` detached and wait until the port
    /// accepts connections.
    ///
    /// The child is never waited on; later invocations find it through the
    /// persisted port.
    pub async fn launch(&self, executable: &Path, port: u16) -> Result<()> {
        let mut command = Command::new(executable);
        command
            .arg("-listen")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut command);

        info!(executable = %executable.display(), port, "starting engine");
        let child = command.spawn().map_err(|source| LocalScanError::Spawn {
            executable: executable.display().to_string(),
            source,
        })?;
        debug!(pid = child.id(), "engine process started");
        drop(child);

        self.wait_for_ready(&format!("localhost:{port}")).await?;
        info!(port, "engine started successfully");
        Ok(())
    }

    /// Poll `address` until a TCP connection succeeds or the deadline passes
    pub async fn wait_for_ready(&self, address: &str) -> Result<()> {
        let started = Instant::now();
        let deadline = started + self.config.ready_timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if let Ok(Ok(_stream)) = tokio::time::timeout(remaining, TcpStream::connect(address)).await {
                debug!(address, elapsed_ms = elapsed_ms(started), "engine is accepting connections");
                return Ok(());
            }
            sleep(self.config.poll_interval.min(deadline.saturating_duration_since(Instant::now())))
                .await;
        }

        Err(LocalScanError::EngineNotReady {
            address: address.to_string(),
            waited_ms: elapsed_ms(started),
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Put the child in its own process group so it survives the CLI.
///
/// This is a new process group, not a new session: the child keeps the
/// CLI's session and controlling terminal. `setsid` needs `pre_exec`, which
/// is unsafe.
#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    command.creation_flags(CREATE_NEW_PROCESS_GROUP | DETACHED_PROCESS);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}
