use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use crate::models::{
    CatalogPage, ContentContext, ContentItem, FacetUpdate, FilterState, FilterStore, SortKey,
};

use super::{
    feed::{ContentFeed, FeedStats},
    view::FilteredView,
};

/// Store, accumulated feed and derived view for one content context
#[derive(Debug)]
pub struct BrowseContext {
    store: FilterStore,
    feed: ContentFeed,
    view: FilteredView,
    query: Option<String>,
}

impl BrowseContext {
    pub fn new(context: ContentContext, feed_capacity: usize) -> Self {
        Self {
            store: FilterStore::new(context),
            feed: ContentFeed::new(context, feed_capacity),
            view: FilteredView::new(),
            query: None,
        }
    }

    pub fn state(&self) -> &FilterState {
        self.store.state()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn feed(&self) -> &ContentFeed {
        &self.feed
    }

    pub fn set_facet(&mut self, update: FacetUpdate) {
        self.store.set_facet(update);
    }

    pub fn set_sort_order(&mut self, key: SortKey) {
        self.store.set_sort_order(key);
    }

    pub fn reset(&mut self) {
        self.store.reset();
    }

    /// Replaces the store with a persisted snapshot
    pub fn restore(&mut self, state: FilterState) {
        self.store = FilterStore::restore(state);
    }

    /// Moves to a new query: clears accumulated items and resets filters
    ///
    /// Returns `false` when the query is unchanged and nothing was reset.
    pub fn change_query(&mut self, query: Option<String>) -> bool {
        let query = query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        if query == self.query {
            return false;
        }

        self.query = query;
        self.feed.clear();
        self.store.reset();
        self.view.invalidate();
        true
    }

    pub fn append_page(&mut self, page: CatalogPage) -> FeedStats {
        self.feed.append_page(page)
    }

    /// Filtered, sorted items for the current feed and filter state
    pub fn results(&mut self) -> Arc<Vec<ContentItem>> {
        self.view.resolve(&self.feed, self.store.state())
    }
}

/// One presentation-layer session with a context per content kind
#[derive(Debug)]
pub struct BrowseSession {
    pub id: Uuid,
    generic: BrowseContext,
    movie: BrowseContext,
    tv: BrowseContext,
    last_access: Instant,
}

impl BrowseSession {
    pub fn new(id: Uuid, feed_capacity: usize) -> Self {
        Self {
            id,
            generic: BrowseContext::new(ContentContext::Generic, feed_capacity),
            movie: BrowseContext::new(ContentContext::Movie, feed_capacity),
            tv: BrowseContext::new(ContentContext::Tv, feed_capacity),
            last_access: Instant::now(),
        }
    }

    /// Marks the session as used now
    pub fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_access.elapsed()
    }

    pub fn context(&self, context: ContentContext) -> &BrowseContext {
        match context {
            ContentContext::Generic => &self.generic,
            ContentContext::Movie => &self.movie,
            ContentContext::Tv => &self.tv,
        }
    }

    pub fn context_mut(&mut self, context: ContentContext) -> &mut BrowseContext {
        match context {
            ContentContext::Generic => &mut self.generic,
            ContentContext::Movie => &mut self.movie,
            ContentContext::Tv => &mut self.tv,
        }
    }

    /// Current snapshot of every context's filter state
    pub fn snapshots(&self) -> Vec<FilterState> {
        ContentContext::ALL
            .into_iter()
            .map(|context| self.context(context).state().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenreFilter;

    fn page(ids: &[u64]) -> CatalogPage {
        CatalogPage {
            page: 1,
            results: ids
                .iter()
                .map(|id| ContentItem::new(*id, format!("Title {}", id)))
                .collect(),
            total_pages: Some(1),
            total_results: None,
        }
    }

    #[test]
    fn test_session_has_every_context() {
        let session = BrowseSession::new(Uuid::new_v4(), 10);
        assert_eq!(session.snapshots().len(), 3);
        assert_eq!(session.context(ContentContext::Tv).state().context, ContentContext::Tv);
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut session = BrowseSession::new(Uuid::new_v4(), 10);
        session
            .context_mut(ContentContext::Movie)
            .set_facet(FacetUpdate::Genre(GenreFilter::Id(28)));

        assert!(session.context(ContentContext::Movie).state().is_filters_active);
        assert!(!session.context(ContentContext::Tv).state().is_filters_active);
    }

    #[test]
    fn test_change_query_resets_filters_and_feed() {
        let mut ctx = BrowseContext::new(ContentContext::Generic, 10);
        ctx.append_page(page(&[1, 2]));
        ctx.set_facet(FacetUpdate::Rating(6.0));

        assert!(ctx.change_query(Some("alien".to_string())));
        assert_eq!(ctx.query(), Some("alien"));
        assert!(ctx.feed().items().is_empty());
        assert!(!ctx.state().is_filters_active);
        assert!(ctx.results().is_empty());
    }

    #[test]
    fn test_same_query_keeps_state() {
        let mut ctx = BrowseContext::new(ContentContext::Generic, 10);
        ctx.change_query(Some("alien".to_string()));
        ctx.append_page(page(&[1]));
        ctx.set_facet(FacetUpdate::Rating(6.0));

        assert!(!ctx.change_query(Some("  alien ".to_string())));
        assert!(ctx.state().is_filters_active);
        assert_eq!(ctx.feed().items().len(), 1);
    }

    #[test]
    fn test_results_follow_sort() {
        let mut ctx = BrowseContext::new(ContentContext::Generic, 10);
        ctx.append_page(page(&[1, 2, 3]));
        ctx.set_sort_order(SortKey::TitleDesc);
        let ids: Vec<u64> = ctx.results().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
