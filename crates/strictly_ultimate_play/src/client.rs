//! HTTP client for the move-recommendation and training service.

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceErrorKind};
use crate::protocol::{
    LearningMetrics, MoveRequest, MoveResponse, SuggestedMove, TrainingAck, TrainingRecord,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Client for the learning service's `/api/move`, `/api/train` and
/// `/api/metrics` endpoints.
#[derive(Debug, Clone)]
pub struct LearningClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl LearningClient {
    /// Creates a client from service settings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the underlying HTTP client cannot be built.
    #[instrument(skip(config), fields(base_url = %config.base_url()))]
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        info!("Created learning service client");
        Ok(Self {
            base_url: config.base_url().trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            client,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Asks the service for a move.
    ///
    /// Returns `Ok(None)` when the service answered without a move.
    ///
    /// # Errors
    ///
    /// Transport failure, timeout, non-success status or an unparseable body.
    #[instrument(skip(self, request), fields(player = %request.current_player))]
    pub async fn recommend_move(
        &self,
        request: &MoveRequest,
    ) -> Result<Option<SuggestedMove>, ServiceError> {
        let response: MoveResponse = self
            .bounded(
                self.client
                    .post(format!("{}/api/move", self.base_url))
                    .json(request)
                    .send(),
            )
            .await?;

        let suggested = response.suggested();
        debug!(?suggested, "Move recommendation received");
        Ok(suggested)
    }

    /// Hands a finished-match record to the service.
    ///
    /// # Errors
    ///
    /// Transport failure, timeout, non-success status or an unparseable body.
    #[instrument(skip(self, record), fields(reward = record.reward))]
    pub async fn submit_training(&self, record: &TrainingRecord) -> Result<(), ServiceError> {
        let ack: TrainingAck = self
            .bounded(
                self.client
                    .post(format!("{}/api/train", self.base_url))
                    .json(record)
                    .send(),
            )
            .await?;

        debug!(status = ?ack.status, "Training record acknowledged");
        Ok(())
    }

    /// Fetches aggregate learning counters.
    ///
    /// # Errors
    ///
    /// Transport failure, timeout, non-success status or an unparseable body.
    #[instrument(skip(self))]
    pub async fn metrics(&self) -> Result<LearningMetrics, ServiceError> {
        self.bounded(
            self.client
                .get(format!("{}/api/metrics", self.base_url))
                .send(),
        )
        .await
    }

    /// Sends a request under the configured deadline and decodes the JSON body.
    async fn bounded<T, F>(&self, send: F) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
        F: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let exchange = async {
            let response = send.await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ServiceError::new(
                    ServiceErrorKind::Status(status.as_u16()),
                    format!("Service responded with {}", status),
                ));
            }
            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(|e| {
                ServiceError::new(ServiceErrorKind::Malformed, format!("{}: {}", e, body))
            })
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::new(
                ServiceErrorKind::Timeout,
                format!("No response within {:?}", self.timeout),
            )),
        }
    }
}
