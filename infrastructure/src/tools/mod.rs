//! Tool adapters available to sub-agents

pub mod web_search;

pub use web_search::{search, SearchError, SearchHit, WEB_SEARCH};
