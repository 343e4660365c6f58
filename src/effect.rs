use std::sync::Arc;

use crate::action::Action;
use crate::api::{self, RecordSource};
use crate::detail;
use crate::pagination::PageRequest;
use crate::region::IdRange;
use crate::request::{Channel, RequestToken};
use crate::state::{ComparePair, RecordSummary};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage { token: RequestToken, request: PageRequest },
    LoadRange { token: RequestToken, range: IdRange },
    LoadFacts { token: RequestToken, records: Vec<RecordSummary> },
    LoadDetail { token: RequestToken, key: String },
    LoadComparison {
        token: RequestToken,
        left: RecordSummary,
        right: RecordSummary,
    },
    /// Abort whatever task is running on this channel.
    Cancel { channel: Channel },
}

impl Effect {
    pub fn channel(&self) -> Channel {
        match self {
            Effect::LoadPage { token, .. }
            | Effect::LoadRange { token, .. }
            | Effect::LoadFacts { token, .. }
            | Effect::LoadDetail { token, .. }
            | Effect::LoadComparison { token, .. } => token.channel,
            Effect::Cancel { channel } => *channel,
        }
    }
}

// Each loader reports through the action carrying its token, so a late
// answer to a superseded request is dropped by the reducer.

pub async fn load_page(
    source: Arc<dyn RecordSource>,
    token: RequestToken,
    request: PageRequest,
) -> Action {
    match source.list_page(&request).await {
        Ok(page) => Action::PageDidLoad { token, page },
        Err(error) => Action::PageDidError { token, error },
    }
}

pub async fn load_range(source: Arc<dyn RecordSource>, token: RequestToken, range: IdRange) -> Action {
    match api::fetch_range(source.as_ref(), range).await {
        Ok(records) => Action::RangeDidLoad { token, records },
        Err(error) => Action::RangeDidError { token, error },
    }
}

pub async fn load_facts(
    source: Arc<dyn RecordSource>,
    token: RequestToken,
    records: Vec<RecordSummary>,
) -> Action {
    let requested = records.iter().filter_map(RecordSummary::id).collect();
    match api::fetch_facts(source, &records).await {
        Ok(facts) => Action::FactsDidLoad {
            token,
            requested,
            facts,
        },
        Err(error) => Action::FactsDidError {
            token,
            requested,
            error,
        },
    }
}

pub async fn load_detail(source: Arc<dyn RecordSource>, token: RequestToken, key: String) -> Action {
    match detail::aggregate(source.as_ref(), &key).await {
        Ok(view) => Action::DetailDidLoad {
            token,
            view: Box::new(view),
        },
        Err(error) => Action::DetailDidError { token, error },
    }
}

pub async fn load_comparison(
    source: Arc<dyn RecordSource>,
    token: RequestToken,
    left: RecordSummary,
    right: RecordSummary,
) -> Action {
    match api::fetch_pair(source.as_ref(), &left.lookup_key(), &right.lookup_key()).await {
        Ok((left, right)) => Action::ComparisonDidLoad {
            token,
            pair: Box::new(ComparePair { left, right }),
        },
        Err(error) => Action::ComparisonDidError { token, error },
    }
}
