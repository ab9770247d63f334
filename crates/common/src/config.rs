use std::{net::SocketAddr, path::PathBuf};

use byte_unit::n_mib_bytes;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing_subscriber::filter::LevelFilter;

/// Database configuration.
#[derive(Deserialize)]
pub struct Database {
    /// Database URL string.
    pub url: String,
}

/// HTTP server configuration.
#[derive(Deserialize)]
pub struct Server {
    /// Address, that HTTP server will listen on.
    pub address: SocketAddr,
}

/// Implementation of [`serde`]'s deserializer for [`FromStr`] types.
#[cfg(feature = "logging")]
fn deserialize_from_str<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error,
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
}

/// Logging configuration.
#[cfg(feature = "logging")]
#[derive(Deserialize)]
#[serde(default)]
pub struct Logging {
    /// Log level.
    #[serde(deserialize_with = "deserialize_from_str")]
    pub level: LevelFilter,

    /// Log level of database drivers and the HTTP transport.
    #[serde(deserialize_with = "deserialize_from_str")]
    pub queries: LevelFilter,
}

#[cfg(feature = "logging")]
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
            queries: LevelFilter::WARN,
        }
    }
}

/// Local file storage configuration.
#[derive(Deserialize)]
pub struct Storage {
    /// Directory in which uploaded content files are kept.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Max accepted request body size for uploads, in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_size() -> usize {
    n_mib_bytes!(50) as usize
}

/// Blockchain network a [`Chain`] configuration points to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Locally started development network.
    Local,

    /// Public test network.
    #[default]
    Testnet,

    /// Main network.
    Mainnet,
}

/// Blockchain client configuration.
#[derive(Default, Deserialize)]
pub struct Chain {
    /// Network to which content and licenses are registered.
    #[serde(default)]
    pub network: Network,

    /// Address of the marketplace contract.
    #[serde(default)]
    pub contract_address: Option<String>,

    /// JSON-RPC wallet endpoint.
    ///
    /// If `None`, every blockchain call is simulated.
    #[serde(default)]
    pub wallet_url: Option<String>,
}

/// General configuration.
#[derive(Deserialize)]
pub struct Config {
    /// General database configuration.
    pub database: Database,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: Option<Server>,

    /// Logging configuration.
    #[cfg(feature = "logging")]
    #[serde(default)]
    pub logging: Logging,

    /// Uploaded file storage configuration.
    #[serde(default)]
    pub storage: Storage,

    /// Blockchain client configuration.
    #[serde(default)]
    pub chain: Chain,
}

impl Config {
    /// Create new config using default configuration file or environment variables.
    ///
    /// See [`Env`] for more details on how to use environment variables configuration.
    ///
    /// [`Env`]: figment::providers::Env
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("Config.toml"))
                .merge(Env::prefixed("CONFIG_").split("_")),
        )
    }

    /// Extract config from an already assembled [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }

    /// Create new config suitable for running unit tests.
    #[cfg(feature = "test-utils")]
    pub fn for_tests() -> Self {
        Self {
            database: Database {
                url: String::from("sqlite::memory:"),
            },
            server: Some(Server {
                address: "127.0.0.1:3000".parse().unwrap(),
            }),
            #[cfg(feature = "logging")]
            logging: Logging::default(),
            storage: Storage::default(),
            chain: Chain::default(),
        }
    }
}
