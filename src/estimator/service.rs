use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::CountError;
use crate::models::CorpusSchema;

/// Document and token counts of a subcorpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcorpusEstimate {
    pub number_of_docs: u64,
    pub tokens_in_matching_documents: u64,
    #[serde(default)]
    pub still_counting: bool,
}

impl SubcorpusEstimate {
    /// The whole corpus, as known from its schema.
    pub fn whole_corpus(schema: &CorpusSchema) -> Self {
        Self {
            number_of_docs: schema.document_count,
            tokens_in_matching_documents: schema.token_count,
            still_counting: false,
        }
    }
}

/// Parameters of a document count request. Asks for totals only, no documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountRequest {
    pub filter: String,
    pub first: u64,
    pub number: u32,
    pub include_token_count: bool,
    pub wait_for_total: bool,
}

impl CountRequest {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            first: 0,
            number: 0,
            include_token_count: true,
            wait_for_total: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountResponse {
    pub summary: SubcorpusEstimate,
}

/// Backend that counts the documents and tokens matching a filter.
///
/// Implementations should abort the request once `cancel` fires. A response produced after
/// cancellation is discarded by the caller.
#[async_trait]
pub trait CountService: Send + Sync {
    async fn count(
        &self,
        corpus_id: &str,
        request: CountRequest,
        cancel: CancellationToken,
    ) -> Result<CountResponse, CountError>;
}
