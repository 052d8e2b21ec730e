use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport, TransportRequest};
use crate::types::{classify_envelope, json_type_name, ApiKey, Element, API_KEY_PARAM, STATE_TOKEN_FIELD};

/// Stateless handle for running WrapAPI elements with one API key.
///
/// Nothing about a `Client` changes after [`ClientBuilder::build`], so clones
/// can be shared freely across tasks. Use [`Client::session`] when calls should
/// carry cookie state from one to the next.
#[derive(Clone)]
pub struct Client {
    api_key: ApiKey,
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client for the default host. Fails if `api_key` is not 32 alphanumerics.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            api_key: api_key.into(),
            config: ClientConfig::default(),
            transport: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Start a session that remembers the latest state token between calls.
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }

    /// Run an API element once.
    ///
    /// Arguments are checked before anything is sent; every problem found is
    /// reported together in one [`Error::InvalidArgument`]. `inputs`, when
    /// given, must be a JSON object and is never modified. A non-empty
    /// `state_token` is added to a copy of the inputs as `stateToken`.
    ///
    /// Resolves to the whole response body when the service reports success.
    pub async fn run(
        &self,
        element: &Element,
        inputs: Option<&Value>,
        state_token: Option<&str>,
    ) -> Result<Value> {
        let body = build_body(element, inputs, state_token)?;

        let request = TransportRequest {
            url: self.config.url(&element.path()),
            query: vec![(API_KEY_PARAM.to_string(), self.api_key.as_str().to_string())],
            body,
        };

        tracing::debug!(
            element = %element,
            with_state = state_token.is_some_and(|t| !t.is_empty()),
            "running api element"
        );

        let response = self.transport.post_json(request).await?;
        classify_envelope(response).inspect_err(|e| {
            if let Error::Remote(remote) = e {
                tracing::warn!(
                    element = %element,
                    err_types = ?remote.err_types(),
                    "api element reported failure: {remote}"
                );
            }
        })
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &self.api_key)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Validate call arguments and assemble the JSON request body.
fn build_body(element: &Element, inputs: Option<&Value>, state_token: Option<&str>) -> Result<Value> {
    let mut errors = element.violations();

    let inputs = match inputs {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            errors.push(format!(
                "inputs should be an object with one key for each input, but is {} instead",
                json_type_name(other)
            ));
            None
        }
    };

    if !errors.is_empty() {
        return Err(Error::InvalidArgument(errors.join("; ")));
    }

    let mut body: Map<String, Value> = inputs.cloned().unwrap_or_default();
    if let Some(token) = state_token.filter(|t| !t.is_empty()) {
        body.insert(STATE_TOKEN_FIELD.to_string(), Value::String(token.to_string()));
    }
    Ok(Value::Object(body))
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    api_key: String,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Base URL of the service, e.g. a local mock during tests.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config = self.config.with_host(host);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Replace all connection settings at once.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Send calls through `transport` instead of HTTP.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Client> {
        let api_key = ApiKey::parse(&self.api_key)?;
        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&self.config)?),
        };
        Ok(Client {
            api_key,
            config: self.config,
            transport,
        })
    }
}
