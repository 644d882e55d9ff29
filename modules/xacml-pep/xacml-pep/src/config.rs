//! Configuration for the PDP client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;
use xacml_pep_sdk::AuthZClientError;

/// Prefix for environment overrides, e.g. `XACML_PEP__PDP_URL` or
/// `XACML_PEP__TLS__MODE`.
pub const ENV_PREFIX: &str = "XACML_PEP__";

/// Environment keys taken verbatim instead of being parsed as numbers,
/// booleans or arrays.
const RAW_ENV_KEYS: &[&str] = &["pdp_url", "username", "password"];

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// PDP client configuration.
///
/// ```yaml
/// pdp_url: "https://pdp.example.com/authorization/pdp"
/// username: "pep"
/// password: "secret"
/// tls:
///   mode: strict
///   ca_certs: ["/etc/pki/pdp-ca.pem"]
/// connect_timeout_ms: 10000
/// request_timeout_ms: 30000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdpClientConfig {
    /// PDP endpoint the decision requests are POSTed to.
    pub pdp_url: String,
    /// HTTP basic authentication user.
    pub username: String,
    /// HTTP basic authentication password.
    pub password: SecretString,
    /// Server certificate trust.
    pub tls: TlsConfig,
    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Timeout for a whole call (connect, send, read) in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for PdpClientConfig {
    fn default() -> Self {
        Self {
            pdp_url: String::new(),
            username: String::new(),
            password: SecretString::from(String::new()),
            tls: TlsConfig::default(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl PdpClientConfig {
    #[must_use]
    pub fn new(
        pdp_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            pdp_url: pdp_url.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = duration_to_ms(timeout);
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = duration_to_ms(timeout);
        self
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Load configuration from an optional YAML file, then apply
    /// `XACML_PEP__*` environment overrides.
    ///
    /// The URL and credentials are read from the environment as plain
    /// strings, so `XACML_PEP__PASSWORD=123456` stays a password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthZClientError::Configuration`] if the file does not exist
    /// or the merged configuration does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, AuthZClientError> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if !path.is_file() {
                return Err(AuthZClientError::Configuration(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }

        let env = Env::prefixed(ENV_PREFIX).split("__");
        figment = figment.merge(env.clone().ignore(RAW_ENV_KEYS));
        for (key, value) in env.only(RAW_ENV_KEYS).iter() {
            figment = figment.merge(Serialized::default(key.as_str(), value));
        }

        figment
            .extract()
            .map_err(|e| AuthZClientError::Configuration(e.to_string()))
    }

    /// Check the configuration and return the parsed PDP URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthZClientError::Configuration`] if the URL is missing,
    /// malformed or not `http`/`https`, if a credential is empty, or if a
    /// timeout is zero.
    pub fn validate(&self) -> Result<Url, AuthZClientError> {
        let raw = self.pdp_url.trim();
        if raw.is_empty() {
            return Err(config_error("pdp_url must not be empty"));
        }

        let url = Url::parse(raw)
            .map_err(|e| config_error(&format!("pdp_url '{raw}' is not a valid URL: {e}")))?;

        match url.scheme() {
            "https" => {}
            "http" => {
                tracing::warn!(
                    pdp_url = %url,
                    "PDP URL uses plain http; basic credentials are sent unencrypted"
                );
            }
            other => {
                return Err(config_error(&format!(
                    "pdp_url scheme must be http or https, got '{other}'"
                )));
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(config_error("pdp_url must contain a host"));
        }

        if self.username.trim().is_empty() {
            return Err(config_error("username must not be empty"));
        }

        if self.password.expose_secret().is_empty() {
            return Err(config_error("password must not be empty"));
        }

        if self.connect_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(config_error("timeouts must be greater than zero"));
        }

        Ok(url)
    }
}

/// Server certificate trust configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlsConfig {
    pub mode: TlsMode,
    /// Trust the platform's root certificates (strict mode only).
    pub use_native_roots: bool,
    /// Additional PEM files with trusted CA certificates (strict mode only).
    pub ca_certs: Vec<PathBuf>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            mode: TlsMode::Strict,
            use_native_roots: true,
            ca_certs: Vec::new(),
        }
    }
}

impl TlsConfig {
    /// Accept every server certificate and host name. Development only.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            mode: TlsMode::Permissive,
            ..Self::default()
        }
    }

    /// Trust only the given CA files.
    #[must_use]
    pub fn with_ca_certs(ca_certs: Vec<PathBuf>) -> Self {
        Self {
            mode: TlsMode::Strict,
            use_native_roots: false,
            ca_certs,
        }
    }
}

/// Certificate validation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
    /// Validate the certificate chain and host name (default).
    #[default]
    Strict,
    /// Skip all certificate and host name checks.
    Permissive,
}

fn config_error(message: &str) -> AuthZClientError {
    AuthZClientError::Configuration(message.to_owned())
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::Jail;
    use std::io::Write as _;

    fn valid() -> PdpClientConfig {
        PdpClientConfig::new("https://pdp.example.com/authorize", "pep", "secret")
    }

    fn assert_config_error(config: &PdpClientConfig, needle: &str) {
        match config.validate() {
            Err(AuthZClientError::Configuration(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {msg}");
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn valid_config_returns_url() {
        let url = valid().validate().unwrap();
        assert_eq!(url.host_str(), Some("pdp.example.com"));
        assert_eq!(url.path(), "/authorize");
    }

    #[test]
    fn defaults_are_strict_with_explicit_timeouts() {
        let config = PdpClientConfig::default();
        assert_eq!(config.tls.mode, TlsMode::Strict);
        assert!(config.tls.use_native_roots);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn empty_url_is_rejected() {
        let mut config = valid();
        config.pdp_url = "  ".to_owned();
        assert_config_error(&config, "pdp_url must not be empty");
    }

    #[test]
    fn malformed_url_is_rejected() {
        let mut config = valid();
        config.pdp_url = "not a url".to_owned();
        assert_config_error(&config, "not a valid URL");
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let mut config = valid();
        config.pdp_url = "ftp://pdp.example.com".to_owned();
        assert_config_error(&config, "scheme");
    }

    #[test]
    fn plain_http_is_allowed() {
        let mut config = valid();
        config.pdp_url = "http://127.0.0.1:8080/pdp".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_username_is_rejected() {
        let config = PdpClientConfig::new("https://pdp.example.com", "", "secret");
        assert_config_error(&config, "username");
    }

    #[test]
    fn empty_password_is_rejected() {
        let config = PdpClientConfig::new("https://pdp.example.com", "pep", "");
        assert_config_error(&config, "password");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = valid().with_request_timeout(Duration::ZERO);
        assert_config_error(&config, "timeouts");
    }

    #[test]
    fn deserializes_from_json_with_defaults() {
        let config: PdpClientConfig = serde_json::from_value(serde_json::json!({
            "pdp_url": "https://pdp.example.com",
            "username": "pep",
            "password": "secret",
            "tls": { "mode": "permissive" }
        }))
        .unwrap();

        assert_eq!(config.tls.mode, TlsMode::Permissive);
        assert!(config.tls.ca_certs.is_empty());
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.password.expose_secret(), "secret");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_value::<PdpClientConfig>(serde_json::json!({
            "pdp_url": "https://pdp.example.com",
            "retries": 3
        }));
        assert!(result.is_err());
    }

    #[test]
    fn loads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "pdp_url: \"https://pdp.example.com/pdp\"\nusername: \"pep\"\npassword: \"pw\"\nrequest_timeout_ms: 5000\ntls:\n  mode: permissive"
        )
        .unwrap();

        let config = PdpClientConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.pdp_url, "https://pdp.example.com/pdp");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.tls.mode, TlsMode::Permissive);
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "pep.yaml",
                "pdp_url: \"https://file.example.com/pdp\"\nusername: \"pep\"\npassword: \"pw\"",
            )?;
            jail.set_env("XACML_PEP__PDP_URL", "https://env.example.com/pdp");
            jail.set_env("XACML_PEP__TLS__MODE", "permissive");
            jail.set_env("XACML_PEP__REQUEST_TIMEOUT_MS", "1500");

            let config = PdpClientConfig::load(Some(Path::new("pep.yaml")))
                .map_err(|e| e.to_string())?;

            assert_eq!(config.pdp_url, "https://env.example.com/pdp");
            assert_eq!(config.username, "pep");
            assert_eq!(config.tls.mode, TlsMode::Permissive);
            assert_eq!(config.request_timeout(), Duration::from_millis(1500));
            Ok(())
        });
    }

    #[test]
    fn numeric_credentials_from_environment_stay_strings() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("XACML_PEP__PDP_URL", "https://pdp.example.com/pdp");
            jail.set_env("XACML_PEP__USERNAME", "1001");
            jail.set_env("XACML_PEP__PASSWORD", "007.50");

            let config = PdpClientConfig::load(None).map_err(|e| e.to_string())?;

            assert_eq!(config.username, "1001");
            assert_eq!(config.password.expose_secret(), "007.50");
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let result = PdpClientConfig::load(Some(Path::new("/nonexistent/xacml-pep.yaml")));
        assert!(matches!(result, Err(AuthZClientError::Configuration(_))));
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("secret"), "{rendered}");
    }
}
