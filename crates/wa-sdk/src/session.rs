use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::types::{Element, STATE_TOKEN_FIELD};

/// A run of calls that share the service's cookie state.
///
/// Obtained from [`Client::session`]. Each successful call may hand back a new
/// `stateToken`; the session keeps the latest one and sends it with the next
/// call. `run` takes `&mut self`, so calls on one session are always
/// sequential.
///
/// When a successful response contains `stateToken`, the stored token is
/// replaced even if the new value is empty or `null`, which drops any earlier
/// state. The upstream `wrapapi` JavaScript client differs here: it only
/// replaces the token with a non-empty string, so an empty or `null` token
/// keeps the old state.
/// Failed calls leave the token alone.
#[derive(Debug)]
pub struct Session<'a> {
    client: &'a Client,
    state_token: Option<String>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            state_token: None,
        }
    }

    /// Resume a session from a token saved earlier.
    pub fn with_state_token(client: &'a Client, state_token: impl Into<String>) -> Self {
        Self {
            client,
            state_token: Some(state_token.into()),
        }
    }

    /// Token that will go out with the next call, if any.
    pub fn state_token(&self) -> Option<&str> {
        self.state_token.as_deref()
    }

    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// Run an element through the wrapped client with the stored token.
    ///
    /// Returns exactly what [`Client::run`] returns.
    pub async fn run(&mut self, element: &Element, inputs: Option<&Value>) -> Result<Value> {
        let response = self
            .client
            .run(element, inputs, self.state_token.as_deref())
            .await?;

        if let Some(token) = response.get(STATE_TOKEN_FIELD) {
            self.state_token = token.as_str().map(str::to_string);
            tracing::trace!(element = %element, has_token = self.state_token.is_some(), "state token updated");
        }

        Ok(response)
    }
}
