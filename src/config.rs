//! Service configuration
//!
//! Built once at startup from environment variables and passed by reference
//! to the orchestrator and the router.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// How a target consumes the resolved geometries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// One call carrying the whole FeatureCollection
    Batch,
    /// One concurrent call per geometry
    PerItem,
}

/// A configured enrichment service
#[derive(Debug, Clone)]
pub struct EnrichmentTarget {
    /// Route name, e.g. `soc`
    pub name: String,
    /// Used in log lines and caller-facing error messages
    pub description: String,
    pub endpoint: Url,
    pub mode: DispatchMode,
    /// Whether the caller's query parameters are appended to each call
    pub forward_query: bool,
}

struct TargetSpec {
    name: &'static str,
    description: &'static str,
    host_var: &'static str,
    port_var: &'static str,
    default_port: &'static str,
    mode: DispatchMode,
    forward_query: bool,
}

const TARGETS: [TargetSpec; 5] = [
    TargetSpec {
        name: "gis",
        description: "parcel stats",
        host_var: "GIS_INFO_SERVICE_HOST",
        port_var: "GIS_INFO_STATS_SERVICE_PORT",
        default_port: "8080",
        mode: DispatchMode::Batch,
        forward_query: false,
    },
    TargetSpec {
        name: "soc",
        description: "SOC approximation",
        host_var: "SOC_INFO_SERVICE_HOST",
        port_var: "SOC_INFO_SERVICE_PORT",
        default_port: "8081",
        mode: DispatchMode::PerItem,
        forward_query: false,
    },
    TargetSpec {
        name: "hydro",
        description: "hydro areas nearby",
        host_var: "HYDRO_INFO_SERVICE_HOST",
        port_var: "HYDRO_INFO_SERVICE_PORT",
        default_port: "8082",
        mode: DispatchMode::PerItem,
        forward_query: true,
    },
    TargetSpec {
        name: "natura2000",
        description: "natura2000 areas nearby",
        host_var: "NATURA2000_INFO_SERVICE_HOST",
        port_var: "NATURA2000_INFO_SERVICE_PORT",
        default_port: "8083",
        mode: DispatchMode::PerItem,
        forward_query: true,
    },
    TargetSpec {
        name: "topsoil",
        description: "TOPSOIL points nearby",
        host_var: "TOPSOIL_INFO_SERVICE_HOST",
        port_var: "TOPSOIL_INFO_SERVICE_PORT",
        default_port: "8084",
        mode: DispatchMode::PerItem,
        forward_query: true,
    },
];

/// Geometry store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    /// Table holding one GeoJSON feature per parcel
    pub table: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    /// Always starts and ends with `/`
    pub url_prefix: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub http: HttpConfig,
    pub targets: Vec<EnrichmentTarget>,
    /// Upper bound for every outbound enrichment call
    pub request_timeout: Duration,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid endpoint for target '{target}': {url}")]
    InvalidEndpoint {
        target: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid value '{value}' for {var}: expected a positive integer")]
    InvalidNumber { var: String, value: String },
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let store = StoreConfig {
            database_url: var("DATABASE_URL", "postgresql://localhost:5432/fast"),
            table: var("LPIS_TABLE", "lpis"),
            max_connections: parse_number("DATABASE_POOL_SIZE", lookup("DATABASE_POOL_SIZE"), 10)?,
            connection_timeout: Duration::from_secs(30),
        };

        let http = HttpConfig {
            bind_addr: var("BIND_ADDR", "0.0.0.0:3000"),
            url_prefix: normalize_prefix(&var("FRONTEND_URL_PREFIX", "/")),
        };

        let timeout_secs = parse_number(
            "ENRICHMENT_TIMEOUT_SECS",
            lookup("ENRICHMENT_TIMEOUT_SECS"),
            30,
        )?;

        let targets = TARGETS
            .iter()
            .map(|spec| {
                let host = var(spec.host_var, "localhost");
                let port = var(spec.port_var, spec.default_port);
                build_target(spec, &host, &port)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            store,
            http,
            targets,
            request_timeout: Duration::from_secs(u64::from(timeout_secs)),
        })
    }

    pub fn target(&self, name: &str) -> Option<&EnrichmentTarget> {
        self.targets.iter().find(|t| t.name == name)
    }
}

fn build_target(spec: &TargetSpec, host: &str, port: &str) -> Result<EnrichmentTarget, ConfigError> {
    let raw = format!("http://{host}:{port}/");
    let endpoint = Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint {
        target: spec.name.to_string(),
        url: raw.clone(),
        source,
    })?;

    Ok(EnrichmentTarget {
        name: spec.name.to_string(),
        description: spec.description.to_string(),
        endpoint,
        mode: spec.mode,
        forward_query: spec.forward_query,
    })
}

fn parse_number(var: &str, value: Option<String>, default: u32) -> Result<u32, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidNumber {
                var: var.to_string(),
                value: raw,
            }),
        },
    }
}

/// Ensure the prefix starts and ends with a slash
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
