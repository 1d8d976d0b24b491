//! Shared run context and cancellation
//!
//! Everything a cascade needs is bundled once per run and shared by all
//! company cascades: configuration, the rate-limited fetcher, the document
//! pipeline components, the audit log, and the cancellation signal.

use crate::acquisition::candidates::CandidateExtractor;
use crate::acquisition::fetcher::Fetcher;
use crate::acquisition::validator::Validator;
use crate::config::Config;
use crate::document::{Classifier, Extractor, LopdfDecoder, PdfDecoder};
use crate::output::AuditLog;
use crate::ScoutError;
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

/// Triggers run-level cancellation
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Observes run-level cancellation
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// Creates a connected cancellation handle and signal
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    /// Requests cancellation; in-flight requests are allowed to finish
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Another signal observing this handle
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl CancelSignal {
    /// A signal that is never triggered
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested
    ///
    /// If the handle is dropped without cancelling, this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Components shared by every cascade in a run
pub struct RunContext {
    pub config: Arc<Config>,
    pub fetcher: Fetcher,
    pub candidates: CandidateExtractor,
    pub validator: Validator,
    pub extractor: Extractor,
    pub classifier: Classifier,
    pub audit: Arc<AuditLog>,
    pub cancel: CancelSignal,
}

impl RunContext {
    /// Builds the context with the lopdf-backed decoder
    pub fn new(config: Config, audit: Arc<AuditLog>, cancel: CancelSignal) -> Result<Self, ScoutError> {
        Self::with_decoder(config, audit, cancel, Arc::new(LopdfDecoder))
    }

    /// Builds the context with a specific PDF decoder
    pub fn with_decoder(
        config: Config,
        audit: Arc<AuditLog>,
        cancel: CancelSignal,
        decoder: Arc<dyn PdfDecoder>,
    ) -> Result<Self, ScoutError> {
        let search_url = Url::parse(&config.search.url)?;
        let fetcher = Fetcher::from_config(&config.search, &config.engine)?;

        Ok(Self {
            candidates: CandidateExtractor::new(&search_url),
            validator: Validator::new(fetcher.clone()),
            extractor: Extractor::new(decoder),
            classifier: Classifier::new(config.engine.classification_prefix_chars),
            fetcher,
            config: Arc::new(config),
            audit,
            cancel,
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
