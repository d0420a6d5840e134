// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`AppConfig`] loaded from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for the database file and documents | `./data` |
//! | `OAUTH2_SECRET_KEY` | Shared secret used to sign access tokens | Required |
//! | `ALGORITHM` | Token signing algorithm (`HS256`, `HS384`, `HS512`) | `HS256` |
//! | `ACCESS_TOKEN_EXPIRE_WEEKS` | Access token lifetime in weeks | `1` |
//! | `DOCUMENT_BACKEND` | Document storage backend (`local` or `s3`) | `local` |
//! | `AWS_ACCESS_KEY` | Object storage access key | Required for `s3` |
//! | `AWS_SECRET_KEY` | Object storage secret key | Required for `s3` |
//! | `AWS_BUCKET_NAME` | Object storage bucket | Required for `s3` |
//! | `AWS_REGION` | Object storage region | `us-east-1` |
//! | `AWS_ENDPOINT` | Object storage endpoint override (MinIO etc.) | AWS virtual host |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// Holds `estate.redb` and the `documents/uploads` tree.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const SECRET_KEY_ENV: &str = "OAUTH2_SECRET_KEY";
pub const ALGORITHM_ENV: &str = "ALGORITHM";
pub const TOKEN_EXPIRE_WEEKS_ENV: &str = "ACCESS_TOKEN_EXPIRE_WEEKS";

pub const DOCUMENT_BACKEND_ENV: &str = "DOCUMENT_BACKEND";
pub const AWS_ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY";
pub const AWS_SECRET_KEY_ENV: &str = "AWS_SECRET_KEY";
pub const AWS_BUCKET_NAME_ENV: &str = "AWS_BUCKET_NAME";
pub const AWS_REGION_ENV: &str = "AWS_REGION";
pub const AWS_ENDPOINT_ENV: &str = "AWS_ENDPOINT";

pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_TOKEN_EXPIRE_WEEKS: i64 = 1;
pub const DEFAULT_AWS_REGION: &str = "us-east-1";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(String),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

const REDACTED: &str = "<redacted>";

/// Token signing settings.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub expire_weeks: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &REDACTED)
            .field("algorithm", &self.algorithm)
            .field("expire_weeks", &self.expire_weeks)
            .finish()
    }
}

/// Credentials and addressing for S3-compatible object storage.
#[derive(Clone, PartialEq, Eq)]
pub struct ObjectStorageConfig {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for ObjectStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorageConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &REDACTED)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBackend {
    Local,
    ObjectStorage(ObjectStorageConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Everything the server needs from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub token: TokenConfig,
    pub documents: DocumentBackend,
    pub tls: Option<TlsConfig>,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let host = env.or_default(HOST_ENV, DEFAULT_HOST);
        let port = match env.optional(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV.to_string(),
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };
        let data_dir = PathBuf::from(env.or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR));

        let token = TokenConfig {
            secret: env.required(SECRET_KEY_ENV)?,
            algorithm: parse_algorithm(&env.or_default(ALGORITHM_ENV, "HS256"))?,
            expire_weeks: match env.optional(TOKEN_EXPIRE_WEEKS_ENV) {
                Some(raw) => match raw.parse::<i64>() {
                    Ok(weeks) if weeks > 0 => weeks,
                    _ => {
                        return Err(ConfigError::Invalid {
                            name: TOKEN_EXPIRE_WEEKS_ENV.to_string(),
                            reason: format!("'{raw}' is not a positive number of weeks"),
                        })
                    }
                },
                None => DEFAULT_TOKEN_EXPIRE_WEEKS,
            },
        };

        let documents = match env.or_default(DOCUMENT_BACKEND_ENV, "local").to_lowercase().as_str() {
            "local" => DocumentBackend::Local,
            "s3" => DocumentBackend::ObjectStorage(ObjectStorageConfig {
                access_key: env.required(AWS_ACCESS_KEY_ENV)?,
                secret_key: env.required(AWS_SECRET_KEY_ENV)?,
                bucket: env.required(AWS_BUCKET_NAME_ENV)?,
                region: env.or_default(AWS_REGION_ENV, DEFAULT_AWS_REGION),
                endpoint: env.optional(AWS_ENDPOINT_ENV),
            }),
            other => {
                return Err(ConfigError::Invalid {
                    name: DOCUMENT_BACKEND_ENV.to_string(),
                    reason: format!("unknown backend '{other}' (expected 'local' or 's3')"),
                })
            }
        };

        let tls = match (env.optional(TLS_CERT_PATH_ENV), env.optional(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV.to_string())),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV.to_string())),
        };

        Ok(Self {
            host,
            port,
            data_dir,
            token,
            documents,
            tls,
        })
    }
}

/// Only HMAC algorithms work with a shared secret.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: ALGORITHM_ENV.to_string(),
        reason: reason.to_string(),
    };
    let algorithm = Algorithm::from_str(raw.trim()).map_err(|_| invalid("unknown algorithm"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(invalid("only HS256, HS384 and HS512 are supported with a shared secret")),
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = load(&[(SECRET_KEY_ENV, "s3cret")]).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.token.algorithm, Algorithm::HS256);
        assert_eq!(config.token.expire_weeks, 1);
        assert_eq!(config.documents, DocumentBackend::Local);
        assert!(config.tls.is_none());
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = load(&[]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(SECRET_KEY_ENV.to_string()));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = load(&[(SECRET_KEY_ENV, "   ")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(SECRET_KEY_ENV.to_string()));
    }

    #[test]
    fn asymmetric_algorithms_are_rejected() {
        let err = load(&[(SECRET_KEY_ENV, "k"), (ALGORITHM_ENV, "RS256")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == ALGORITHM_ENV));
    }

    #[test]
    fn token_lifetime_must_be_positive() {
        let err = load(&[(SECRET_KEY_ENV, "k"), (TOKEN_EXPIRE_WEEKS_ENV, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let config = load(&[(SECRET_KEY_ENV, "k"), (TOKEN_EXPIRE_WEEKS_ENV, "4")]).unwrap();
        assert_eq!(config.token.expire_weeks, 4);
    }

    #[test]
    fn s3_backend_requires_credentials() {
        let err = load(&[(SECRET_KEY_ENV, "k"), (DOCUMENT_BACKEND_ENV, "s3")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(AWS_ACCESS_KEY_ENV.to_string()));

        let config = load(&[
            (SECRET_KEY_ENV, "k"),
            (DOCUMENT_BACKEND_ENV, "S3"),
            (AWS_ACCESS_KEY_ENV, "AKID"),
            (AWS_SECRET_KEY_ENV, "secret"),
            (AWS_BUCKET_NAME_ENV, "estate-docs"),
        ])
        .unwrap();
        match config.documents {
            DocumentBackend::ObjectStorage(s3) => {
                assert_eq!(s3.bucket, "estate-docs");
                assert_eq!(s3.region, DEFAULT_AWS_REGION);
                assert!(s3.endpoint.is_none());
            }
            DocumentBackend::Local => panic!("expected object storage backend"),
        }
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&[
            (SECRET_KEY_ENV, "jwt-signing-secret"),
            (DOCUMENT_BACKEND_ENV, "s3"),
            (AWS_ACCESS_KEY_ENV, "AKID"),
            (AWS_SECRET_KEY_ENV, "s3-secret-value"),
            (AWS_BUCKET_NAME_ENV, "estate-docs"),
        ])
        .unwrap();

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("jwt-signing-secret"));
        assert!(!rendered.contains("s3-secret-value"));
        assert!(rendered.contains("AKID"));
        assert!(rendered.contains("estate-docs"));
    }

    #[test]
    fn tls_requires_both_paths() {
        let err = load(&[(SECRET_KEY_ENV, "k"), (TLS_CERT_PATH_ENV, "/tmp/cert.pem")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(TLS_KEY_PATH_ENV.to_string()));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = load(&[(SECRET_KEY_ENV, "k"), (PORT_ENV, "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == PORT_ENV));
    }
}
