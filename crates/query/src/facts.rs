use atlas_fact_store::FactStore;
use atlas_protocol::{AtlasError, Fact, FactFilter, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Pagination window for typed fact queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FactPage {
    pub facts: Vec<Fact>,
    /// Honest overflow flag: one extra row is probed past the limit.
    pub has_more: bool,
}

/// Typed fact query with offset/limit pagination.
///
/// An empty filter is rejected: at least one of subject, predicate or
/// object must be given.
pub async fn find_facts<S: FactStore + ?Sized>(
    store: &S,
    filter: &FactFilter,
    page: Page,
) -> Result<FactPage> {
    if filter.is_empty() {
        return Err(AtlasError::Validation(
            "fact filter must set at least one of subject, predicate, object".into(),
        ));
    }

    let all = store.find(filter).await?;
    let mut window: Vec<Fact> = all
        .into_iter()
        .skip(page.offset)
        .take(page.limit + 1)
        .collect();

    let has_more = window.len() > page.limit;
    window.truncate(page.limit);

    Ok(FactPage {
        facts: window,
        has_more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_fact_store::MemoryFactStore;
    use atlas_protocol::Predicate;
    use pretty_assertions::assert_eq;

    fn seeded(n: usize) -> MemoryFactStore {
        MemoryFactStore::with_facts(
            (0..n)
                .map(|i| {
                    Fact::new(
                        format!("function:a.ts#f{i}"),
                        Predicate::Calls,
                        "function:a.ts#shared",
                    )
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn empty_filter_is_rejected() {
        let store = seeded(1);
        let err = find_facts(&store, &FactFilter::default(), Page::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AtlasError::Validation(_)));
    }

    #[tokio::test]
    async fn has_more_is_honest_over_the_limit() {
        let store = seeded(6);
        let filter = FactFilter::predicate(Predicate::Calls);

        let page = find_facts(&store, &filter, Page { offset: 0, limit: 5 })
            .await
            .unwrap();
        assert_eq!(page.facts.len(), 5);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn has_more_is_honest_at_the_limit() {
        let store = seeded(5);
        let filter = FactFilter::predicate(Predicate::Calls);

        let page = find_facts(&store, &filter, Page { offset: 0, limit: 5 })
            .await
            .unwrap();
        assert_eq!(page.facts.len(), 5);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn offset_windows_through_results() {
        let store = seeded(7);
        let filter = FactFilter::predicate(Predicate::Calls);

        let page = find_facts(&store, &filter, Page { offset: 5, limit: 5 })
            .await
            .unwrap();
        assert_eq!(page.facts.len(), 2);
        assert!(!page.has_more);
    }
}
