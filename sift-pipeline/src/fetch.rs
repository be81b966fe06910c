use sift_web::{SearchProvider, SearchResultItem};

use crate::error::PipelineError;

/// One search per query, in order, results concatenated as returned.
/// Repeated links across queries are kept.
pub async fn fetch_results(
    search: &dyn SearchProvider,
    queries: &[String],
    per_query: u32,
) -> Result<Vec<SearchResultItem>, PipelineError> {
    let mut all = Vec::with_capacity(queries.len() * per_query as usize);
    for query in queries {
        let items = search
            .search(query, per_query)
            .await
            .map_err(|source| PipelineError::Search {
                query: query.clone(),
                source,
            })?;
        tracing::debug!(
            provider = search.provider_name(),
            query = %query,
            hits = items.len(),
            "pipeline.fetch.query"
        );
        all.extend(items);
    }
    tracing::info!(queries = queries.len(), results = all.len(), "pipeline.fetch.done");
    Ok(all)
}
