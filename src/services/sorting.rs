use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Strength};

use crate::models::{ContentItem, SortField, SortKey};

/// Compares two items by the field a sort key selects
///
/// Returns `None` for [`SortKey::Default`], which never reorders.
pub fn compare(a: &ContentItem, b: &ContentItem, key: SortKey) -> Option<Ordering> {
    let (field, descending) = key.ordering()?;

    let ord = match field {
        SortField::Rating => a.vote_average.total_cmp(&b.vote_average),
        SortField::Popularity => a.popularity.total_cmp(&b.popularity),
        // Missing dates compare as earliest
        SortField::Date => a.date().cmp(&b.date()),
        SortField::Title => compare_titles(&a.title, &b.title),
    };

    Some(if descending { ord.reverse() } else { ord })
}

thread_local! {
    // Root locale, secondary strength: accents count, case does not
    static TITLE_COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        match Collator::try_new(&Default::default(), options) {
            Ok(collator) => Some(collator),
            Err(e) => {
                tracing::warn!(error = %e, "Title collator unavailable, falling back to lowercase order");
                None
            }
        }
    };
}

/// Locale-aware, case-insensitive title order
fn compare_titles(a: &str, b: &str) -> Ordering {
    TITLE_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    })
}

/// Sorts in place; items comparing equal keep their relative order
pub fn sort_items(items: &mut [ContentItem], key: SortKey) {
    if key == SortKey::Default {
        return;
    }
    items.sort_by(|a, b| compare(a, b, key).unwrap_or(Ordering::Equal));
}
