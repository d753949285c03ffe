//! Subcorpus size estimation.
//!
//! Two independent channels turn filter sets into document and token counts:
//!
//! - [`Channel::Live`] follows the filters as they are being edited. Every edit immediately
//!   publishes [`SubcorpusEvent::Cleared`] so stale counts are not shown while the new count
//!   is pending.
//! - [`Channel::Submitted`] follows the filters of the submitted query.
//!
//! Both wait for a quiet period before counting, and a newer edit cancels the request in
//! flight. Without active filters the corpus totals are used and no request is made. A failed
//! request ends its channel.

mod channel;
pub mod dispatcher;
pub mod service;

use std::sync::Arc;

use serde::Serialize;

use self::channel::EstimatorChannel;
use crate::config::EstimatorSettings;
use crate::error::CountError;
use crate::models::{CorpusSchema, FilterMap};

pub use dispatcher::{Dispatcher, Topic};
pub use service::{CountRequest, CountResponse, CountService, SubcorpusEstimate};

/// Names of the estimator topics in the dispatcher.
pub const LIVE_TOPIC: &str = "subcorpus.live";
pub const SUBMITTED_TOPIC: &str = "subcorpus.submitted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Live,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SubcorpusEvent {
    /// Filters changed, the previous count no longer applies
    Cleared,
    Counted(SubcorpusEstimate),
    #[serde(serialize_with = "serialize_error")]
    Failed(CountError),
}

fn serialize_error<S: serde::Serializer>(err: &CountError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

pub struct SubcorpusEstimator {
    dispatcher: Dispatcher<SubcorpusEvent>,
    live: EstimatorChannel,
    submitted: EstimatorChannel,
}

impl SubcorpusEstimator {
    pub fn new(
        service: Arc<dyn CountService>,
        schema: &CorpusSchema,
        settings: &EstimatorSettings,
    ) -> Self {
        let dispatcher = Dispatcher::new();
        let totals = SubcorpusEstimate::whole_corpus(schema);
        let channel = |name: &'static str, clear_on_edit| {
            EstimatorChannel::new(
                name,
                clear_on_edit,
                settings.debounce(),
                schema.id.clone(),
                totals,
                Arc::clone(&service),
                dispatcher.topic(name),
            )
        };
        let live = channel(LIVE_TOPIC, true);
        let submitted = channel(SUBMITTED_TOPIC, false);
        Self { dispatcher, live, submitted }
    }

    fn topic_name(channel: Channel) -> &'static str {
        match channel {
            Channel::Live => LIVE_TOPIC,
            Channel::Submitted => SUBMITTED_TOPIC,
        }
    }

    /// Filters in the search form changed.
    pub fn edit_filters(&self, filters: &FilterMap) {
        self.live.edit(filters);
    }

    /// A query with these filters was submitted.
    pub fn submit_filters(&self, filters: &FilterMap) {
        self.submitted.edit(filters);
    }

    /// Events of `channel`, starting with the latest one if any.
    pub fn subscribe(&self, channel: Channel) -> tokio::sync::mpsc::UnboundedReceiver<SubcorpusEvent> {
        self.dispatcher.subscribe(Self::topic_name(channel))
    }

    pub fn latest(&self, channel: Channel) -> Option<SubcorpusEvent> {
        self.dispatcher.topic(Self::topic_name(channel)).latest()
    }
}

impl Drop for SubcorpusEstimator {
    fn drop(&mut self) {
        self.live.cancel();
        self.submitted.cancel();
    }
}
