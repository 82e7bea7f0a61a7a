//! Stage 1: query resolution.
//!
//! Turns the user's free text into a [`SearchQuery`] and asks the collection
//! for matching object identifiers. An empty identifier list is a valid
//! answer; the pipeline ends cleanly on it. Any failure of the search call
//! itself (non-200 status, transport error, bad JSON) ends the run.

use crate::api::{ApiError, CollectionApi, SearchQuery};
use crate::config::SearchConfig;
use crate::types::ObjectId;
use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("search failed: {0}")]
    Search(#[from] ApiError),
    #[error("cannot read query: {0}")]
    Io(#[from] std::io::Error),
}

/// Prompt shown when no query was given on the command line or in config.
pub const PROMPT: &str = "Enter a keyword and/or geographic location to search for: ";

/// Build the search call for `text` under the `[search]` settings.
///
/// Surrounding whitespace is dropped; whitespace-only text is rejected
/// before any request is made.
pub fn search_query(text: &str, config: &SearchConfig) -> Result<SearchQuery, ResolveError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ResolveError::EmptyQuery);
    }
    Ok(SearchQuery::new(text, config.geo_location))
}

/// Run the search. `Ok(vec![])` means the collection has nothing matching.
pub fn resolve(
    api: &impl CollectionApi,
    query: &SearchQuery,
) -> Result<Vec<ObjectId>, ResolveError> {
    tracing::debug!(
        "searching for {:?} (geoLocation: {})",
        query.text,
        query.geo_location
    );
    let ids = api.search(query)?;
    tracing::debug!("search returned {} ids", ids.len());
    Ok(ids)
}

/// Ask for a query interactively: print [`PROMPT`], read one line.
pub fn prompt_query(input: &mut impl BufRead, output: &mut impl Write) -> Result<String, ResolveError> {
    write!(output, "{PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let text = line.trim();
    if text.is_empty() {
        return Err(ResolveError::EmptyQuery);
    }
    Ok(text.to_string())
}
