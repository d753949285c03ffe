//! One debounced estimation pipeline: filter edits in, subcorpus events out.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::SubcorpusEvent;
use super::dispatcher::Topic;
use super::service::{CountRequest, CountService, SubcorpusEstimate};
use crate::filters::filter_string;
use crate::models::FilterMap;

pub(crate) struct EstimatorChannel {
    name: &'static str,
    clear_on_edit: bool,
    debounce: Duration,
    corpus_id: String,
    totals: SubcorpusEstimate,
    service: Arc<dyn CountService>,
    topic: Arc<Topic<SubcorpusEvent>>,
    current: Mutex<Option<CancellationToken>>,
}

impl EstimatorChannel {
    pub(crate) fn new(
        name: &'static str,
        clear_on_edit: bool,
        debounce: Duration,
        corpus_id: String,
        totals: SubcorpusEstimate,
        service: Arc<dyn CountService>,
        topic: Arc<Topic<SubcorpusEvent>>,
    ) -> Self {
        Self {
            name,
            clear_on_edit,
            debounce,
            corpus_id,
            totals,
            service,
            topic,
            current: Mutex::new(None),
        }
    }

    /// Start a new estimation for `filters`, cancelling the one in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn edit(&self, filters: &FilterMap) {
        if self.topic.is_closed() {
            debug!(channel = self.name, "channel ended after a failed count, ignoring edit");
            return;
        }

        let token = CancellationToken::new();
        {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
        }

        if self.clear_on_edit {
            self.topic.publish(SubcorpusEvent::Cleared);
        }

        let task = Estimation {
            channel: self.name,
            debounce: self.debounce,
            corpus_id: self.corpus_id.clone(),
            totals: self.totals,
            filter: filter_string(filters),
            service: Arc::clone(&self.service),
            topic: Arc::clone(&self.topic),
        };
        tokio::spawn(task.run(token));
    }

    pub(crate) fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = current.take() {
            token.cancel();
        }
    }
}

struct Estimation {
    channel: &'static str,
    debounce: Duration,
    corpus_id: String,
    totals: SubcorpusEstimate,
    filter: Option<String>,
    service: Arc<dyn CountService>,
    topic: Arc<Topic<SubcorpusEvent>>,
}

impl Estimation {
    async fn run(self, cancel: CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(self.debounce) => {}
        }

        let Some(filter) = self.filter else {
            debug!(channel = self.channel, "no active filters, using corpus totals");
            self.topic
                .publish_if(SubcorpusEvent::Counted(self.totals), || !cancel.is_cancelled());
            return;
        };

        debug!(channel = self.channel, %filter, "requesting subcorpus size");
        let request = CountRequest::new(filter);
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(channel = self.channel, "count request superseded");
                return;
            }
            result = self.service.count(&self.corpus_id, request, cancel.clone()) => result,
        };

        // A service may still answer after being cancelled. The token is checked under the
        // topic lock, an edit cancels it before publishing its own events.
        let current = || !cancel.is_cancelled();
        match result {
            Ok(response) => {
                let event = SubcorpusEvent::Counted(response.summary);
                if !self.topic.publish_if(event, current) && cancel.is_cancelled() {
                    debug!(channel = self.channel, "discarding response of superseded count request");
                }
            }
            Err(err) => {
                let message = err.to_string();
                if self.topic.finish_if(SubcorpusEvent::Failed(err), current) {
                    warn!(channel = self.channel, error = %message, "subcorpus count failed, channel ended");
                } else {
                    debug!(channel = self.channel, error = %message, "discarding failure of superseded count request");
                }
            }
        }
    }
}
