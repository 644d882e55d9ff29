//! rustls client configuration for the PDP connection.
//!
//! Built per client from [`TlsConfig`]; nothing is installed process-wide.

use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use xacml_pep_sdk::AuthZClientError;

use crate::config::{TlsConfig, TlsMode};

/// Build the rustls client configuration for the given trust settings.
///
/// # Errors
///
/// Returns [`AuthZClientError::Configuration`] when a CA file cannot be read
/// or parsed, or when strict mode ends up with no trust anchors.
pub fn build_client_config(tls: &TlsConfig) -> Result<ClientConfig, AuthZClientError> {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| AuthZClientError::Configuration(format!("TLS protocol setup: {e}")))?;

    let config = match tls.mode {
        TlsMode::Strict => builder
            .with_root_certificates(root_store(tls)?)
            .with_no_client_auth(),
        TlsMode::Permissive => {
            tracing::warn!(
                "TLS certificate and host name validation is DISABLED for the PDP connection; \
                 do not use this mode in production"
            );
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider }))
                .with_no_client_auth()
        }
    };

    Ok(config)
}

fn root_store(tls: &TlsConfig) -> Result<RootCertStore, AuthZClientError> {
    let mut roots = RootCertStore::empty();

    if tls.use_native_roots {
        let native = rustls_native_certs::load_native_certs();
        for error in &native.errors {
            tracing::warn!(error = %error, "failed to load some native root certificates");
        }
        let (added, ignored) = roots.add_parsable_certificates(native.certs);
        tracing::debug!(added, ignored, "loaded native root certificates");
    }

    for path in &tls.ca_certs {
        let added = add_pem_file(&mut roots, path)?;
        tracing::debug!(path = %path.display(), added, "loaded CA certificates");
    }

    if roots.is_empty() {
        return Err(AuthZClientError::Configuration(
            "strict TLS mode has no trusted root certificates".to_owned(),
        ));
    }

    Ok(roots)
}

fn add_pem_file(roots: &mut RootCertStore, path: &Path) -> Result<usize, AuthZClientError> {
    let invalid = |detail: String| {
        AuthZClientError::Configuration(format!("CA file {}: {detail}", path.display()))
    };

    let mut added = 0;
    for cert in CertificateDer::pem_file_iter(path).map_err(|e| invalid(e.to_string()))? {
        let cert = cert.map_err(|e| invalid(e.to_string()))?;
        roots.add(cert).map_err(|e| invalid(e.to_string()))?;
        added += 1;
    }

    if added == 0 {
        return Err(invalid("no certificates found".to_owned()));
    }
    Ok(added)
}

/// Verifier that accepts any server certificate for any host name.
///
/// Handshake signatures are still checked so the peer must hold the key of
/// the certificate it presents.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
