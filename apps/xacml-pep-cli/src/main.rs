//! `xacml-pep-cli` - send a sample authorization request to a PDP and log
//! the decisions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use static_pdp_plugin::{StaticPdpPluginConfig, StaticPdpTransport};
use tracing_subscriber::EnvFilter;
use xacml_pep::{PdpClient, PdpClientConfig, TlsMode};
use xacml_pep_sdk::{
    AuthZClient, Category, EnforcerError, PolicyEnforcer, Request, Response, Status, codec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    /// POST to the configured PDP.
    Http,
    /// Answer in-process with a static permit-all policy.
    Static,
}

#[derive(Debug, Parser)]
#[allow(clippy::struct_excessive_bools)] // independent CLI switches
#[command(name = "xacml-pep-cli", version, about = "Query an XACML JSON PDP")]
struct Cli {
    /// YAML configuration file (`XACML_PEP__*` environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// PDP endpoint URL
    #[arg(long)]
    pdp_url: Option<String>,

    /// Basic authentication user
    #[arg(short, long)]
    username: Option<String>,

    /// Basic authentication password
    #[arg(short, long)]
    password: Option<String>,

    /// Accept any PDP certificate (development only)
    #[arg(long)]
    permissive_tls: bool,

    /// Transport used to reach the PDP
    #[arg(long, value_enum, default_value_t = TransportKind::Http)]
    transport: TransportKind,

    /// Ask about two resources at once (multiple decision request)
    #[arg(long)]
    multi: bool,

    /// Deny-biased enforcement: exit with an error unless every decision is Permit
    #[arg(long)]
    enforce: bool,

    /// Print the encoded request before sending it
    #[arg(long)]
    print_request: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let request = sample_request(cli.multi)?;
    if cli.print_request {
        let encoded = codec::encode_request(&request).context("encoding request")?;
        println!("{}", String::from_utf8_lossy(&encoded));
    }

    let client: Arc<dyn AuthZClient> = match cli.transport {
        TransportKind::Http => {
            let config = resolve_config(&cli)?;
            Arc::new(PdpClient::new(&config).context("building PDP client")?)
        }
        TransportKind::Static => Arc::new(PdpClient::with_transport(Arc::new(
            StaticPdpTransport::new(StaticPdpPluginConfig::default()),
        ))),
    };

    if cli.enforce {
        return match PolicyEnforcer::new(client).authorize(&request).await {
            Ok(response) => {
                log_decisions(&response);
                tracing::info!("access granted");
                Ok(())
            }
            Err(EnforcerError::Denied { decision, status }) => Err(anyhow::anyhow!(
                "access denied: {decision} (status: {})",
                status.as_ref().and_then(Status::code).unwrap_or("none")
            )),
            Err(e @ EnforcerError::EvaluationFailed(_)) => Err(e).context("authorization failed"),
        };
    }

    let response = client
        .make_authorization_request(&request)
        .await
        .context("authorization request failed")?;
    log_decisions(&response);

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Merge the configuration file, environment and command-line flags.
fn resolve_config(cli: &Cli) -> Result<PdpClientConfig> {
    let config = PdpClientConfig::load(cli.config.as_deref()).context("loading configuration")?;
    Ok(apply_flags(cli, config))
}

fn apply_flags(cli: &Cli, mut config: PdpClientConfig) -> PdpClientConfig {
    if let Some(url) = &cli.pdp_url {
        config.pdp_url.clone_from(url);
    }
    if let Some(username) = &cli.username {
        config.username.clone_from(username);
    }
    if let Some(password) = &cli.password {
        config.password = password.clone().into();
    }
    if cli.permissive_tls {
        config.tls.mode = TlsMode::Permissive;
    }

    config
}

/// Subject `iub=123, role=user` accessing resource `sbie`, optionally
/// together with a second resource.
fn sample_request(multi: bool) -> Result<Request> {
    let mut builder = Request::builder()
        .access_subject(
            Category::new()
                .with_attribute("Attributes.access_subject.iub", "123")
                .with_attribute("Attributes.access_subject.role", "user"),
        )
        .resource(Category::new().with_attribute("bnc.object.objectId", "sbie"))
        .action(Category::new().with_attribute("bnc.action.actionId", "access"))
        .return_policy_id_list(true);

    if multi {
        builder = builder
            .resource(Category::new().with_attribute("bnc.object.objectId", "sbie-archive"));
    }

    builder.build().context("building sample request")
}

fn log_decisions(response: &Response) {
    for (index, result) in response.results().iter().enumerate() {
        let policies = result
            .policy_identifier_list
            .as_ref()
            .map_or_else(String::new, |ids| {
                ids.policy_id_reference
                    .iter()
                    .map(|r| r.id.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            });
        tracing::info!(
            index,
            decision = %result.decision,
            status = result.status.as_ref().and_then(Status::code).unwrap_or(""),
            policies = %policies,
            obligations = result.obligations.len(),
            "Decision"
        );
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::Jail;
    use xacml_pep_sdk::{CategoryKind, Decision};

    #[test]
    fn sample_request_is_single_decision() {
        let request = sample_request(false).unwrap();
        assert!(!request.is_multi_decision_request());
        assert!(request.return_policy_id_list());
        assert_eq!(request.categories(CategoryKind::AccessSubject)[0].attributes.len(), 2);
    }

    #[test]
    fn multi_flag_builds_multi_decision_request() {
        let request = sample_request(true).unwrap();
        assert!(request.is_multi_decision_request());
        assert_eq!(request.individual_decision_count(), 2);
    }

    #[test]
    fn flags_override_configuration() {
        let cli = Cli::try_parse_from([
            "xacml-pep-cli",
            "--pdp-url",
            "https://pdp.example.com/pdp",
            "--username",
            "pep",
            "--password",
            "secret",
            "--permissive-tls",
        ])
        .unwrap();

        let config = apply_flags(&cli, PdpClientConfig::default());

        assert_eq!(config.pdp_url, "https://pdp.example.com/pdp");
        assert_eq!(config.username, "pep");
        assert_eq!(config.tls.mode, TlsMode::Permissive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn flags_take_precedence_over_config_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "pep.yaml",
                "pdp_url: \"https://file.example.com/pdp\"\nusername: \"from-file\"\npassword: \"pw\"",
            )?;

            let cli = Cli::try_parse_from([
                "xacml-pep-cli",
                "--config",
                "pep.yaml",
                "--username",
                "from-flag",
            ])
            .map_err(|e| e.to_string())?;
            let config = resolve_config(&cli).map_err(|e| e.to_string())?;

            assert_eq!(config.pdp_url, "https://file.example.com/pdp");
            assert_eq!(config.username, "from-flag");
            assert_eq!(config.tls.mode, TlsMode::Strict);
            Ok(())
        });
    }

    #[test]
    fn transport_defaults_to_http() {
        let cli = Cli::try_parse_from(["xacml-pep-cli"]).unwrap();
        assert_eq!(cli.transport, TransportKind::Http);
        assert!(!cli.multi);
    }

    #[tokio::test]
    async fn static_transport_answers_sample_request() {
        let client = PdpClient::with_transport(Arc::new(StaticPdpTransport::default()));

        let response = client
            .make_authorization_request(&sample_request(true).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.decisions().collect::<Vec<_>>(),
            vec![Decision::Permit, Decision::Permit]
        );
    }
}
