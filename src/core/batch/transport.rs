//! Batch transport and the public entry point
//!
//! [`Batcher`] owns the configuration snapshot, the built-in pipeline
//! (validate, dispatch, normalize) and an optional [`Transport`] override that
//! replaces that pipeline wholesale.

use super::dispatcher::Dispatcher;
use super::error_codes::ErrorCodeTable;
use super::normalizer::ResponseNormalizer;
use super::types::{BatchInput, BatchRequest, BatchResults};
use super::validator::{DefaultValidator, RequestValidator, validate_requests};
use crate::config::BatcherConfig;
use crate::utils::error::Result;
use crate::utils::net::{HttpSender, ReqwestSender};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Runs a whole batch
///
/// Implement this to substitute the transport, e.g. for tests or an alternate
/// backend. An installed override receives the caller's requests untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn issue_calls(&self, requests: Vec<BatchRequest>) -> Result<BatchResults>;
}

/// The built-in pipeline over one configuration snapshot
pub struct Pipeline {
    config: Arc<BatcherConfig>,
    sender: Arc<dyn HttpSender>,
    validator: Arc<dyn RequestValidator>,
}

impl Pipeline {
    pub fn new(
        config: Arc<BatcherConfig>,
        sender: Arc<dyn HttpSender>,
        validator: Arc<dyn RequestValidator>,
    ) -> Self {
        Self {
            config,
            sender,
            validator,
        }
    }
}

#[async_trait]
impl Transport for Pipeline {
    async fn issue_calls(&self, requests: Vec<BatchRequest>) -> Result<BatchResults> {
        debug!(count = requests.len(), "Transport running issue_calls");
        let codes = Arc::new(ErrorCodeTable::from_config(&self.config.error_codes));

        let batch = validate_requests(
            &requests,
            &self.config.request,
            self.validator.as_ref(),
            &codes,
        );

        let normalizer = Arc::new(ResponseNormalizer::new(self.config.original_header, codes));
        let dispatcher = Dispatcher::new(Arc::clone(&self.sender), normalizer);

        match dispatcher
            .dispatch(batch.valid, batch.invalid, self.config.max_concurrent_batches)
            .await
        {
            Ok(results) => {
                debug!(results = results.len(), "Transport finished running requests");
                Ok(results)
            }
            Err(err) => {
                error!("Transport error in running requests: {}", err);
                Err(err)
            }
        }
    }
}

/// Public entry point for issuing batches
pub struct Batcher {
    config: ArcSwap<BatcherConfig>,
    sender: Arc<dyn HttpSender>,
    validator: Arc<dyn RequestValidator>,
    transport: Option<Arc<dyn Transport>>,
}

impl Batcher {
    /// Batcher with the default `reqwest` sender and validation rules
    pub fn new(config: BatcherConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            config: ArcSwap::from_pointee(config),
            sender: Arc::new(ReqwestSender::new()),
            validator: Arc::new(DefaultValidator),
            transport: None,
        })
    }

    pub fn with_sender(mut self, sender: Arc<dyn HttpSender>) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn RequestValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Install (`Some`) or clear (`None`) the transport override
    pub fn set_transport(&mut self, transport: Option<Arc<dyn Transport>>) {
        debug!(installed = transport.is_some(), "Setting transport override");
        self.transport = transport;
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Replace the configuration used by batches started from now on
    pub fn configure(&self, config: BatcherConfig) -> Result<()> {
        config.check()?;
        self.config.store(Arc::new(config));
        Ok(())
    }

    pub fn config(&self) -> Arc<BatcherConfig> {
        self.config.load_full()
    }

    /// Run one batch and return a result per request name.
    ///
    /// Invalid requests and transport failures are recorded in the mapping.
    /// An `Err` means the batch was aborted and no mapping exists.
    pub async fn issue_calls(&self, input: impl Into<BatchInput>) -> Result<BatchResults> {
        let requests = input.into().into_requests();

        if let Some(transport) = &self.transport {
            debug!(count = requests.len(), "Delegating batch to transport override");
            return transport.issue_calls(requests).await;
        }

        let pipeline = Pipeline::new(
            self.config(),
            Arc::clone(&self.sender),
            Arc::clone(&self.validator),
        );
        pipeline.issue_calls(requests).await
    }
}

#[async_trait]
impl Transport for Batcher {
    async fn issue_calls(&self, requests: Vec<BatchRequest>) -> Result<BatchResults> {
        Batcher::issue_calls(self, requests).await
    }
}
