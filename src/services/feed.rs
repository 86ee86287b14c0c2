use std::collections::HashSet;

use serde::Serialize;

use crate::models::{CatalogPage, ContentContext, ContentItem, MediaKind};

/// Paging progress reported back to the fetch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub added: usize,
    pub total_items: usize,
    pub last_page: u32,
    pub total_pages: Option<u32>,
    pub has_more: bool,
}

/// Growing list of catalog items accumulated from successive pages
///
/// Items are deduplicated by `(media_type, id)` across pages so the engine
/// never sees the same title twice.
#[derive(Debug, Clone)]
pub struct ContentFeed {
    context: ContentContext,
    items: Vec<ContentItem>,
    seen: HashSet<(Option<MediaKind>, u64)>,
    last_page: u32,
    total_pages: Option<u32>,
    generation: u64,
    capacity: usize,
}

impl ContentFeed {
    pub fn new(context: ContentContext, capacity: usize) -> Self {
        Self {
            context,
            items: Vec::new(),
            seen: HashSet::new(),
            last_page: 0,
            total_pages: None,
            generation: 0,
            capacity,
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Changes whenever the item list changes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Appends unseen items from a page, up to the feed capacity
    pub fn append_page(&mut self, page: CatalogPage) -> FeedStats {
        let mut added = 0;
        let fallback_kind = self.context.media_kind();

        for mut item in page.results {
            if self.items.len() >= self.capacity {
                tracing::warn!(
                    context = %self.context,
                    capacity = self.capacity,
                    "Feed capacity reached, dropping remaining items"
                );
                break;
            }
            if item.media_type.is_none() {
                item.media_type = fallback_kind;
            }
            if self.seen.insert((item.media_type, item.id)) {
                self.items.push(item);
                added += 1;
            }
        }

        self.last_page = self.last_page.max(page.page);
        if page.total_pages.is_some() {
            self.total_pages = page.total_pages;
        }
        if added > 0 {
            self.generation += 1;
        }

        tracing::debug!(
            context = %self.context,
            page = page.page,
            added,
            total = self.items.len(),
            "Appended catalog page"
        );

        self.stats(added)
    }

    pub fn has_more(&self) -> bool {
        match self.total_pages {
            Some(total) => self.last_page < total,
            None => self.last_page == 0,
        }
    }

    pub fn stats(&self, added: usize) -> FeedStats {
        FeedStats {
            added,
            total_items: self.items.len(),
            last_page: self.last_page,
            total_pages: self.total_pages,
            has_more: self.has_more(),
        }
    }

    /// Drops every item for a new query
    pub fn clear(&mut self) {
        let had_items = !self.items.is_empty();
        self.items.clear();
        self.seen.clear();
        self.last_page = 0;
        self.total_pages = None;
        if had_items {
            self.generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, ids: &[u64], total_pages: Option<u32>) -> CatalogPage {
        CatalogPage {
            page: number,
            results: ids
                .iter()
                .map(|id| ContentItem::new(*id, format!("Title {}", id)))
                .collect(),
            total_pages,
            total_results: None,
        }
    }

    #[test]
    fn test_append_deduplicates_across_pages() {
        let mut feed = ContentFeed::new(ContentContext::Movie, 100);
        feed.append_page(page(1, &[1, 2, 3], Some(3)));
        let stats = feed.append_page(page(2, &[3, 4], Some(3)));

        assert_eq!(stats.added, 1);
        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.last_page, 2);
        assert!(stats.has_more);
        let ids: Vec<u64> = feed.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_same_id_different_kind_is_kept_in_generic_feed() {
        let mut feed = ContentFeed::new(ContentContext::Generic, 100);
        let mut movie = ContentItem::new(7, "Movie Seven");
        movie.media_type = Some(MediaKind::Movie);
        let mut show = ContentItem::new(7, "Show Seven");
        show.media_type = Some(MediaKind::Tv);

        let stats = feed.append_page(CatalogPage {
            page: 1,
            results: vec![movie, show],
            total_pages: Some(1),
            total_results: Some(2),
        });
        assert_eq!(stats.added, 2);
        assert!(!stats.has_more);
    }

    #[test]
    fn test_context_kind_fills_missing_media_type() {
        let mut feed = ContentFeed::new(ContentContext::Tv, 100);
        feed.append_page(page(1, &[1], None));
        assert_eq!(feed.items()[0].media_type, Some(MediaKind::Tv));
    }

    #[test]
    fn test_generation_moves_only_on_change() {
        let mut feed = ContentFeed::new(ContentContext::Movie, 100);
        assert_eq!(feed.generation(), 0);
        feed.append_page(page(1, &[1, 2], None));
        assert_eq!(feed.generation(), 1);
        feed.append_page(page(1, &[1, 2], None));
        assert_eq!(feed.generation(), 1);
        feed.clear();
        assert_eq!(feed.generation(), 2);
        assert!(feed.items().is_empty());
        assert!(feed.has_more());
    }

    #[test]
    fn test_capacity_bounds_items() {
        let mut feed = ContentFeed::new(ContentContext::Movie, 2);
        let stats = feed.append_page(page(1, &[1, 2, 3], None));
        assert_eq!(stats.added, 2);
        assert_eq!(stats.total_items, 2);
    }
}
