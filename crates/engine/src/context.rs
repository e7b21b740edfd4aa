//! Explicit per-caller context
//!
//! Bundles what a coordinator needs instead of reaching for globals:
//! the store handle, the retry configuration, and a cancellation token.
//! The caller owns the context and decides its lifetime.

use crate::backoff::CancelToken;
use crate::resolution::ManualResolutionCoordinator;
use crate::retry::RetryCoordinator;
use slotlock_core::{RecordStore, RetryConfig};
use std::sync::Arc;

/// Store handle, configuration, and cancellation for one caller
pub struct Context<S: RecordStore + ?Sized> {
    store: Arc<S>,
    config: RetryConfig,
    cancel: CancelToken,
}

impl<S: RecordStore + ?Sized> Context<S> {
    /// Context with the default [`RetryConfig`] and a fresh token
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: RetryConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the retry configuration
    pub fn with_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing cancellation token
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// A new owning handle to the store
    pub fn store_handle(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Cancellation token consulted by backoff waits
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Automatic retry coordinator bound to this context
    pub fn retry(&self) -> RetryCoordinator<'_, S> {
        RetryCoordinator::new(self)
    }

    /// Manual resolution coordinator bound to this context
    pub fn manual(&self) -> ManualResolutionCoordinator<'_, S> {
        ManualResolutionCoordinator::new(self)
    }
}

impl<S: RecordStore + ?Sized> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
            cancel: self.cancel.clone(),
        }
    }
}
