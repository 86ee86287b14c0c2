use std::sync::Arc;

use crate::models::{ContentItem, FilterState};

use super::{feed::ContentFeed, filtering};

/// Memoized derived view over a feed and a filter snapshot
///
/// Recomputes only when the feed generation or any field of the snapshot
/// differs from the previous call.
#[derive(Debug, Default)]
pub struct FilteredView {
    cached: Option<CachedView>,
}

#[derive(Debug)]
struct CachedView {
    generation: u64,
    state: FilterState,
    items: Arc<Vec<ContentItem>>,
}

impl FilteredView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, feed: &ContentFeed, state: &FilterState) -> Arc<Vec<ContentItem>> {
        if let Some(cached) = &self.cached {
            if cached.generation == feed.generation() && &cached.state == state {
                return Arc::clone(&cached.items);
            }
        }

        let items = Arc::new(filtering::apply(feed.items(), state));
        self.cached = Some(CachedView {
            generation: feed.generation(),
            state: state.clone(),
            items: Arc::clone(&items),
        });
        items
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogPage, ContentContext, FacetUpdate, FilterStore};

    fn feed_with(ids: &[u64]) -> ContentFeed {
        let mut feed = ContentFeed::new(ContentContext::Generic, 100);
        feed.append_page(CatalogPage {
            page: 1,
            results: ids
                .iter()
                .map(|id| {
                    let mut item = ContentItem::new(*id, format!("Title {}", id));
                    item.vote_average = *id as f64;
                    item
                })
                .collect(),
            total_pages: None,
            total_results: None,
        });
        feed
    }

    #[test]
    fn test_unchanged_inputs_reuse_result() {
        let feed = feed_with(&[1, 2, 3]);
        let store = FilterStore::new(ContentContext::Generic);
        let mut view = FilteredView::new();

        let first = view.resolve(&feed, store.state());
        let second = view.resolve(&feed, store.state());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_state_change_recomputes() {
        let feed = feed_with(&[1, 5, 9]);
        let mut store = FilterStore::new(ContentContext::Generic);
        let mut view = FilteredView::new();

        let before = view.resolve(&feed, store.state());
        store.set_facet(FacetUpdate::Rating(5.0));
        let after = view.resolve(&feed, store.state());

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.len(), 3);
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_feed_growth_recomputes() {
        let mut feed = feed_with(&[1]);
        let store = FilterStore::new(ContentContext::Generic);
        let mut view = FilteredView::new();

        assert_eq!(view.resolve(&feed, store.state()).len(), 1);
        feed.append_page(CatalogPage {
            page: 2,
            results: vec![ContentItem::new(2, "Second")],
            total_pages: None,
            total_results: None,
        });
        assert_eq!(view.resolve(&feed, store.state()).len(), 2);
    }
}
