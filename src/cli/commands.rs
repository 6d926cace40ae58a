//! CLI command implementations
//!
//! Every command that touches the log goes through the same boot path:
//! load config, load the key, open the store, build a [`LogService`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::http_server::{HttpServer, HttpServerConfig};
use crate::log::{FileStore, MemoryStore, Record, RecordStore};
use crate::mac::{MacEngine, SecretKey, RECOMMENDED_KEY_LEN};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::service::LogService;
use crate::verify::VerificationReport;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Environment variable read for the key when the config names none
pub const DEFAULT_KEY_ENV: &str = "TAMPERLOG_SECRET_KEY";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bind address, CORS, body limit
    #[serde(flatten)]
    pub http: HttpServerConfig,

    /// Environment variable holding the key (default: TAMPERLOG_SECRET_KEY)
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// File holding the key; takes precedence over `key_env`
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// Data directory; when absent the log lives in memory only
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Seed the demo records into an empty store at startup
    #[serde(default)]
    pub seed_demo: bool,
}

fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            key_env: default_key_env(),
            key_file: None,
            data_dir: None,
            seed_demo: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.http.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        if self.http.max_body_bytes == 0 {
            return Err(CliError::config_error("max_body_bytes must be > 0"));
        }

        if self.key_env.trim().is_empty() {
            return Err(CliError::config_error("key_env must not be empty"));
        }

        self.http
            .cors_header_values()
            .map_err(CliError::config_error)?;

        Ok(())
    }

    /// Load the secret key from `key_file`, or from `key_env`
    pub fn load_key(&self) -> CliResult<SecretKey> {
        let key = match &self.key_file {
            Some(path) => SecretKey::from_file(path)?,
            None => SecretKey::from_env(&self.key_env)?,
        };
        Ok(key)
    }

    fn require_data_dir(&self) -> CliResult<&Path> {
        self.data_dir.as_deref().ok_or_else(CliError::no_data_dir)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Append { config, data } => report(append(config.as_deref(), &data)),
        Command::Verify { config } => report(verify(config.as_deref())),
        Command::Latest { config } => report(latest(config.as_deref())),
        Command::Keygen => keygen(),
    }
}

/// Print the outcome of a one-shot command as a JSON line
fn report(result: CliResult<Value>) -> CliResult<()> {
    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Build the service described by `config`.
///
/// Loads the key, opens the store and seeds the demo records when asked.
/// Any failure here aborts startup.
pub fn build_service(config: &Config) -> CliResult<Arc<LogService>> {
    let engine = MacEngine::new(config.load_key()?)?;

    let store: Arc<dyn RecordStore> = match &config.data_dir {
        Some(dir) => Arc::new(FileStore::open(dir)?),
        None => Arc::new(MemoryStore::new()),
    };

    let service = Arc::new(LogService::new(engine, store));

    if service.has_weak_key() {
        let recommended = RECOMMENDED_KEY_LEN.to_string();
        log_event_with_fields(
            Event::WeakSecretKey,
            &[("recommended_min_bytes", recommended.as_str())],
        );
    }

    if config.seed_demo {
        service.seed_demo()?;
    }

    Ok(service)
}

/// Load config and build the service, logging the boot events
fn boot(config_path: Option<&Path>) -> CliResult<(Config, Arc<LogService>)> {
    log_event(Event::BootStart);

    let result = Config::load_or_default(config_path).and_then(|config| {
        let store = if config.data_dir.is_some() { "file" } else { "memory" };
        log_event_with_fields(Event::ConfigLoaded, &[("store", store)]);
        let service = build_service(&config)?;
        Ok((config, service))
    });

    if let Err(e) = &result {
        log_event_with_fields(
            Event::BootFailed,
            &[("code", e.code_str()), ("message", e.message())],
        );
    }

    result
}

/// Start the HTTP server
///
/// 1. Load configuration
/// 2. Load key, open store, seed if configured
/// 3. Serve until the listener fails
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let (config, service) = boot(config_path)?;

    let mut http_config = config.http;
    if let Some(port) = port {
        if port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }
        http_config.port = port;
    }

    let server = HttpServer::new(http_config, service);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Append `data` to the durable log
pub fn append(config_path: Option<&Path>, data: &str) -> CliResult<Value> {
    let service = durable_service(config_path)?;
    let record = service.append(data.as_bytes().to_vec())?;
    Ok(record_json(&record))
}

/// Verify the durable log
pub fn verify(config_path: Option<&Path>) -> CliResult<Value> {
    let service = durable_service(config_path)?;
    let report = service.verify_latest()?;
    Ok(report_json(&report))
}

/// Newest record of the durable log, unverified
pub fn latest(config_path: Option<&Path>) -> CliResult<Value> {
    let service = durable_service(config_path)?;
    let record = service.latest_raw()?;
    Ok(record.as_ref().map(record_json).unwrap_or(Value::Null))
}

/// Print a fresh random key
pub fn keygen() -> CliResult<()> {
    write_response(json!({ "key": SecretKey::generate_hex() }))
}

fn durable_service(config_path: Option<&Path>) -> CliResult<Arc<LogService>> {
    let config = Config::load_or_default(config_path)?;
    config.require_data_dir()?;
    build_service(&config)
}

fn record_json(record: &Record) -> Value {
    json!({
        "data": record.data_lossy(),
        "tag": record.tag.to_hex(),
        "timestamp": record.timestamp,
        "sequence": record.sequence,
    })
}

fn report_json(report: &VerificationReport) -> Value {
    json!({
        "message": report.message(),
        "data": report.data().map(|d| String::from_utf8_lossy(d).into_owned()),
        "verdict": report.verdict.as_str(),
        "corrupted": report.corrupted,
        "scanned": report.scanned,
    })
}
