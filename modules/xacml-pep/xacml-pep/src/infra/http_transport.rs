//! HTTP(S) transport to a remote PDP.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use secrecy::ExposeSecret;
use xacml_pep_sdk::codec;
use xacml_pep_sdk::{
    AuthZClientError, DecisionVariant, PdpPayload, PdpTransport, Request, XACML_JSON_MEDIA_TYPE,
};

use super::tls;
use crate::config::PdpClientConfig;

/// Longest error body kept in [`AuthZClientError::Status`] and
/// [`AuthZClientError::Unauthorized`].
const MAX_ERROR_BODY_CHARS: usize = 2048;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Transport that POSTs XACML JSON documents to a PDP endpoint.
///
/// Cheap to share behind an `Arc`; the underlying connection pool is
/// internally synchronized.
pub struct HttpPdpTransport {
    client: HttpsClient,
    uri: Uri,
    authorization: HeaderValue,
    request_timeout: Duration,
}

impl HttpPdpTransport {
    /// Build the transport from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthZClientError::Configuration`] if the configuration is
    /// invalid or the TLS trust store cannot be built.
    pub fn new(config: &PdpClientConfig) -> Result<Self, AuthZClientError> {
        let url = config.validate()?;
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| AuthZClientError::Configuration(format!("pdp_url: {e}")))?;

        let tls_config = tls::build_client_config(&config.tls)?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(config.connect_timeout()));

        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new()).build(https);

        Ok(Self {
            client,
            uri,
            authorization: basic_auth(&config.username, config.password.expose_secret())?,
            request_timeout: config.request_timeout(),
        })
    }

    #[tracing::instrument(skip_all, fields(variant = variant.as_str(), uri = %self.uri))]
    async fn post(
        &self,
        request: &Request,
        variant: DecisionVariant,
    ) -> Result<PdpPayload, AuthZClientError> {
        let body = codec::encode_request(request)
            .map_err(|e| AuthZClientError::Serialization(e.to_string()))?;

        let http_request = http::Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header(CONTENT_TYPE, XACML_JSON_MEDIA_TYPE)
            .header(ACCEPT, XACML_JSON_MEDIA_TYPE)
            .header(AUTHORIZATION, self.authorization.clone())
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| AuthZClientError::Transport(e.to_string()))?;

        let (status, body) = tokio::time::timeout(self.request_timeout, self.exchange(http_request))
            .await
            .map_err(|_| AuthZClientError::Timeout(self.request_timeout))??;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "PDP answered");

        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthZClientError::Unauthorized {
                status: status.as_u16(),
                body: error_body(&body),
            });
        }
        if !status.is_success() {
            return Err(AuthZClientError::Status {
                status: status.as_u16(),
                body: error_body(&body),
            });
        }

        let payload = codec::decode_response(&body)?;
        let shape_matches = matches!(
            (&payload, variant),
            (PdpPayload::Multi(_), DecisionVariant::MultiDecision)
                | (PdpPayload::Single(_), DecisionVariant::SingleDecision)
        );
        if !shape_matches {
            tracing::debug!("PDP answered with the other response shape");
        }

        Ok(payload)
    }

    async fn exchange(
        &self,
        request: http::Request<Full<Bytes>>,
    ) -> Result<(StatusCode, Bytes), AuthZClientError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| classify_client_error(&e))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| AuthZClientError::Transport(format!("reading response body: {e}")))?
            .to_bytes();

        Ok((status, body))
    }
}

#[async_trait]
impl PdpTransport for HttpPdpTransport {
    async fn send(
        &self,
        request: &Request,
        variant: DecisionVariant,
    ) -> Result<PdpPayload, AuthZClientError> {
        self.post(request, variant).await
    }
}

impl std::fmt::Debug for HttpPdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPdpTransport")
            .field("uri", &self.uri)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

fn basic_auth(username: &str, password: &str) -> Result<HeaderValue, AuthZClientError> {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|_| {
        AuthZClientError::Configuration("credentials produce an invalid header".to_owned())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn error_body(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}

fn classify_client_error(error: &hyper_util::client::legacy::Error) -> AuthZClientError {
    if let Some(tls) = find_rustls_error(error) {
        return AuthZClientError::Tls(tls.to_string());
    }
    let message = error_chain(error);
    if error.is_connect() {
        AuthZClientError::Connect(message)
    } else {
        AuthZClientError::Transport(message)
    }
}

/// Look for a rustls error anywhere in the chain.
///
/// `io::Error` forwards `source()` to its inner error's source, skipping the
/// inner error itself, so those nodes are unwrapped with `get_ref()`.
fn find_rustls_error<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a rustls::Error> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(tls) = err.downcast_ref::<rustls::Error>() {
            return Some(tls);
        }
        current = match err.downcast_ref::<std::io::Error>().and_then(std::io::Error::get_ref) {
            Some(inner) => Some(inner as &(dyn StdError + 'static)),
            None => err.source(),
        };
    }
    None
}

fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}
