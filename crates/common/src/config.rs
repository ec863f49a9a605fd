use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// How each accepted submission changes the monitor configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// The file is replaced wholesale by a book holding only the new record.
    #[default]
    Replace,
    /// The new record is added after the records already in the file.
    Append,
}

impl FromStr for WritePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(WritePolicy::Replace),
            "append" => Ok(WritePolicy::Append),
            other => Err(anyhow::anyhow!(
                "CONFIG_WRITE_POLICY must be 'replace' or 'append', got '{}'",
                other
            )),
        }
    }
}

impl std::fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WritePolicy::Replace => write!(f, "replace"),
            WritePolicy::Append => write!(f, "append"),
        }
    }
}

/// The external monitor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child; inherits ours when unset
    pub working_dir: Option<PathBuf>,
}

impl Default for MonitorCommand {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec!["run".to_string(), "--release".to_string()],
            working_dir: None,
        }
    }
}

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// Monitor configuration file (`AddressAndChain.toml`)
    pub config_path: PathBuf,

    /// Environment file receiving `WEBHOOK=` lines
    pub env_path: PathBuf,

    /// Directory holding `form.html` and `start.html`
    pub template_dir: PathBuf,

    /// Replace or append on each submission (default: replace)
    pub write_policy: WritePolicy,

    /// Command started by the confirmation page
    pub monitor: MonitorCommand,

    /// Maximum accepted request body in bytes (default: 1 MiB)
    pub max_body_bytes: usize,

    /// Per-request timeout (default: 15s)
    pub request_timeout: Duration,

    /// Limit on reading a request head, including the wait on an idle
    /// keep-alive connection (default: 60s)
    pub idle_timeout: Duration,

    /// How long in-flight requests may drain after a shutdown signal (default: 15s)
    pub shutdown_grace: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let monitor_args = var("MONITOR_ARGS")
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| MonitorCommand::default().args);

        Ok(Self {
            bind_addr: parse_or(&var, "BIND_ADDR", "0.0.0.0:8080")?,
            config_path: var("MONITOR_CONFIG_PATH")
                .unwrap_or_else(|| "AddressAndChain.toml".to_string())
                .into(),
            env_path: var("MONITOR_ENV_PATH")
                .unwrap_or_else(|| ".env".to_string())
                .into(),
            template_dir: var("TEMPLATE_DIR")
                .unwrap_or_else(|| "static".to_string())
                .into(),
            write_policy: parse_or(&var, "CONFIG_WRITE_POLICY", "replace")?,
            monitor: MonitorCommand {
                program: var("MONITOR_COMMAND").unwrap_or_else(|| "cargo".to_string()),
                args: monitor_args,
                working_dir: var("MONITOR_WORKDIR").map(PathBuf::from),
            },
            max_body_bytes: parse_or(&var, "MAX_BODY_BYTES", "1048576")?,
            request_timeout: Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", "15")?),
            idle_timeout: Duration::from_secs(parse_or(&var, "IDLE_TIMEOUT_SECS", "60")?),
            shutdown_grace: Duration::from_secs(parse_or(&var, "SHUTDOWN_GRACE_SECS", "15")?),
        })
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: &str) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .unwrap_or_else(|| default.to_string())
        .parse()
        .map_err(|e| anyhow::anyhow!("{} is invalid: {}", key, e))
}
