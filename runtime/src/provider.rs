//! HTTP decision provider
//!
//! POSTs each [`DecisionRequest`] as JSON to a configured endpoint and parses
//! the answer with [`DecisionResponse::parse`]. The battle engine calls
//! providers synchronously, so [`HttpDecisionProvider::decide`] blocks on the
//! runtime handle it was built with. It must run on a blocking thread, which
//! is where the worker runs automated turns.

use std::time::Duration;

use coliseum_battle::{DecisionProvider, ProviderError};
use coliseum_protocol::{DecisionRequest, DecisionResponse};
use reqwest::Url;
use tokio::runtime::Handle;

use crate::RuntimeError;
use crate::config::ProviderConfig;

pub struct HttpDecisionProvider {
    client: reqwest::Client,
    /// `None` when the configured endpoint is not a valid URL
    endpoint: Option<Url>,
    timeout: Duration,
    runtime: Handle,
}

impl HttpDecisionProvider {
    pub fn new(config: &ProviderConfig, runtime: Handle) -> Result<Self, RuntimeError> {
        let endpoint = match Url::parse(&config.endpoint) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    target: "coliseum::runtime",
                    endpoint = %config.endpoint,
                    error = %e,
                    "Invalid decision provider endpoint"
                );
                None
            }
        };

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            endpoint,
            timeout: config.timeout(),
            runtime,
        })
    }

    async fn post(&self, url: Url, request: &DecisionRequest) -> Result<DecisionResponse, ProviderError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        let decision = DecisionResponse::parse(&body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if let Some(reason) = &decision.reason {
            tracing::debug!(
                target: "coliseum::runtime",
                player = %request.player,
                choice = ?decision.choice,
                reason = %reason,
                "Decision provider answered"
            );
        }
        Ok(decision)
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::Transport(e.to_string())
    }
}

impl DecisionProvider for HttpDecisionProvider {
    fn is_reachable(&self) -> bool {
        self.endpoint.is_some()
    }

    fn decide(&self, request: &DecisionRequest) -> Result<DecisionResponse, ProviderError> {
        let Some(url) = self.endpoint.clone() else {
            return Err(ProviderError::Unreachable);
        };

        self.runtime.block_on(async {
            tokio::time::timeout(self.timeout, self.post(url, request))
                .await
                .unwrap_or(Err(ProviderError::Timeout(self.timeout)))
        })
    }
}
