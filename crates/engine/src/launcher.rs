//! Process launcher — starts and supervises the external balance monitor.
//!
//! The monitor runs in a detached tokio task so the confirmation page never
//! waits on process startup. The task's handle is retained here, which lets
//! the server report the monitor's status and stop it on shutdown.

use std::process::{ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use beacon_common::config::MonitorCommand;

/// Why a monitor run ended badly. Only ever affects the launcher task.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting on monitor process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("monitor exited unsuccessfully: {0}")]
    NonZeroExit(ExitStatus),
}

/// Lifecycle of the most recent monitor run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MonitorStatus {
    Idle,
    Running { pid: Option<u32> },
    Exited { code: Option<i32> },
    Failed { reason: String },
}

/// Result of asking the launcher to start the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Started,
    AlreadyRunning,
}

pub struct MonitorLauncher {
    command: MonitorCommand,
    current: Mutex<Option<JoinHandle<Result<ExitStatus, LaunchError>>>>,
    status: watch::Sender<MonitorStatus>,
}

impl MonitorLauncher {
    pub fn new(command: MonitorCommand) -> Self {
        let (status, _) = watch::channel(MonitorStatus::Idle);
        Self {
            command,
            current: Mutex::new(None),
            status,
        }
    }

    /// Start the monitor in the background unless a previous run is still alive.
    ///
    /// Must be called from within a tokio runtime. Returns immediately.
    pub fn launch(&self) -> LaunchOutcome {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(task) = current.as_ref()
            && !task.is_finished()
        {
            tracing::info!(
                program = %self.command.program,
                "Monitor already running, not starting another"
            );
            return LaunchOutcome::AlreadyRunning;
        }

        // Published before the task exists so no observer sees the previous
        // run's terminal status after a successful launch.
        self.status.send_replace(MonitorStatus::Running { pid: None });

        let command = self.command.clone();
        let status = self.status.clone();
        *current = Some(tokio::spawn(supervise(command, status)));

        LaunchOutcome::Started
    }

    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    /// Watch status transitions of the monitor.
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Abort the supervising task. The child is spawned with `kill_on_drop`,
    /// so it is terminated along with the task.
    pub fn shutdown(&self) {
        let task = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(task) = task
            && !task.is_finished()
        {
            tracing::info!("Stopping monitor process");
            task.abort();
            self.status.send_replace(MonitorStatus::Failed {
                reason: "stopped by server shutdown".to_string(),
            });
        }
    }
}

async fn supervise(
    command: MonitorCommand,
    status: watch::Sender<MonitorStatus>,
) -> Result<ExitStatus, LaunchError> {
    tracing::info!(
        program = %command.program,
        args = ?command.args,
        "Starting monitor process"
    );

    let result = run(&command, &status).await;

    match &result {
        Ok(exit) => {
            tracing::info!(code = ?exit.code(), "Monitor process exited");
            status.send_replace(MonitorStatus::Exited { code: exit.code() });
        }
        Err(e) => {
            tracing::error!(error = %e, "Monitor process failed");
            status.send_replace(MonitorStatus::Failed {
                reason: e.to_string(),
            });
        }
    }

    result
}

async fn run(
    command: &MonitorCommand,
    status: &watch::Sender<MonitorStatus>,
) -> Result<ExitStatus, LaunchError> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    if let Some(dir) = &command.working_dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        program: command.program.clone(),
        source,
    })?;

    let pid = child.id();
    tracing::info!(pid = ?pid, "Monitor process started");
    status.send_replace(MonitorStatus::Running { pid });

    let exit = child.wait().await.map_err(LaunchError::Wait)?;
    if exit.success() {
        Ok(exit)
    } else {
        Err(LaunchError::NonZeroExit(exit))
    }
}
