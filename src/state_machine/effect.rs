//! Effects produced by state transitions

use crate::search::SearchRequest;

/// Side effects the runtime carries out after committing a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Cancel and forget the user's in-flight search
    CancelSearch,

    /// Register a new search for the user and start it
    LaunchSearch(SearchRequest),
}
