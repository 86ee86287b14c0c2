//! Filtering/sorting engine
//!
//! Derives the list to display from an accumulated list of catalog items and a
//! [`FilterState`] snapshot. Predicates only run while filters are active and
//! only for facets listed for the snapshot's context; sorting always runs.

use tracing::instrument;

use crate::models::{Choice, ContentItem, FacetKind, FilterState, GenreFilter};

use super::sorting::sort_items;

/// Applies the snapshot's predicates, then its sort order
///
/// Never mutates `items`. Returns an identical list when filters are inactive
/// and the sort key is `default`.
#[instrument(skip_all, fields(context = %state.context, input = items.len()))]
pub fn apply(items: &[ContentItem], state: &FilterState) -> Vec<ContentItem> {
    let mut output: Vec<ContentItem> = if state.is_filters_active {
        items
            .iter()
            .filter(|item| matches(item, state))
            .cloned()
            .collect()
    } else {
        items.to_vec()
    };

    sort_items(&mut output, state.sort_by);

    tracing::debug!(
        output = output.len(),
        active = state.is_filters_active,
        sort_by = %state.sort_by,
        "Derived filtered view"
    );

    output
}

/// Conjunction of every predicate the context declares
pub fn matches(item: &ContentItem, state: &FilterState) -> bool {
    state
        .context
        .facets()
        .iter()
        .all(|facet| facet_matches(*facet, item, state))
}

fn facet_matches(facet: FacetKind, item: &ContentItem, state: &FilterState) -> bool {
    match facet {
        FacetKind::Rating => state.rating <= 0.0 || item.vote_average >= state.rating,
        FacetKind::Genre => match state.genre {
            GenreFilter::All => true,
            GenreFilter::Id(id) => item.genre_ids.contains(&id),
        },
        FacetKind::DateRange => date_in_range(item, state),
        FacetKind::Popularity => state.popularity <= 0.0 || item.popularity >= state.popularity,
        FacetKind::VoteCount => state.vote_count == 0 || item.vote_count >= state.vote_count,
        FacetKind::IncludeAdult => state.include_adult || !item.adult,
        FacetKind::OriginalLanguage => {
            choice_matches(&state.original_language, item.original_language.as_deref())
        }
        FacetKind::Status => choice_matches(&state.status, item.status.as_deref()),
        FacetKind::ShowType => choice_matches(&state.show_type, item.show_type.as_deref()),
        FacetKind::WithCast => text_matches(&state.with_cast, item.associations.cast.as_deref()),
        FacetKind::WithCrew => text_matches(&state.with_crew, item.associations.crew.as_deref()),
        FacetKind::WithCompanies => {
            text_matches(&state.with_companies, item.associations.companies.as_deref())
        }
        FacetKind::WithNetworks => {
            text_matches(&state.with_networks, item.associations.networks.as_deref())
        }
        FacetKind::WithKeywords => {
            text_matches(&state.with_keywords, item.associations.keywords.as_deref())
        }
    }
}

/// Inclusive on both ends; an absent bound is open. Undated items fail once
/// any bound is set.
fn date_in_range(item: &ContentItem, state: &FilterState) -> bool {
    if !state.has_date_bound() {
        return true;
    }
    let Some(date) = item.date() else {
        return false;
    };
    state.date_start.map_or(true, |start| date >= start)
        && state.date_end.map_or(true, |end| date <= end)
}

fn choice_matches(choice: &Choice, value: Option<&str>) -> bool {
    match choice {
        Choice::All => true,
        Choice::Only(wanted) => value == Some(wanted.as_str()),
    }
}

/// Case-insensitive substring over any entry of the field
///
/// Skipped when the filter is blank or the item does not carry the field.
fn text_matches(filter: &str, field: Option<&[String]>) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    match field {
        None => true,
        Some(entries) => entries
            .iter()
            .any(|entry| entry.to_lowercase().contains(&needle)),
    }
}
