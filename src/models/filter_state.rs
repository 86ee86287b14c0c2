use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::{ContentContext, FacetKind, SortKey};

/// Genre facet value: every genre, or one catalog genre id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawGenre", into = "String")]
pub enum GenreFilter {
    #[default]
    All,
    Id(u32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGenre {
    Id(u32),
    Text(String),
}

impl TryFrom<RawGenre> for GenreFilter {
    type Error = String;

    fn try_from(raw: RawGenre) -> Result<Self, Self::Error> {
        match raw {
            RawGenre::Id(id) => Ok(GenreFilter::Id(id)),
            RawGenre::Text(text) if text.trim() == "all" => Ok(GenreFilter::All),
            RawGenre::Text(text) => text
                .trim()
                .parse()
                .map(GenreFilter::Id)
                .map_err(|_| format!("genre must be \"all\" or a genre id, got {:?}", text)),
        }
    }
}

impl From<GenreFilter> for String {
    fn from(genre: GenreFilter) -> Self {
        match genre {
            GenreFilter::All => "all".to_string(),
            GenreFilter::Id(id) => id.to_string(),
        }
    }
}

/// Enumerated string facet with an "all" sentinel (language, status, type)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl From<String> for Choice {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "all" {
            Choice::All
        } else {
            Choice::Only(trimmed.to_string())
        }
    }
}

impl From<Choice> for String {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::All => "all".to_string(),
            Choice::Only(value) => value,
        }
    }
}

impl Choice {
    pub fn only(value: impl Into<String>) -> Self {
        Choice::from(value.into())
    }
}

/// Accepts `null`, `""` or `YYYY-MM-DD`
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(day) => NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Snapshot of every facet value for one filtering context
///
/// Missing fields deserialize to the defaults of the context named in the
/// payload, or of the generic context when none is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialFilterState")]
pub struct FilterState {
    pub context: ContentContext,
    pub rating: f64,
    pub genre: GenreFilter,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub popularity: f64,
    pub vote_count: u32,
    pub sort_by: SortKey,
    pub include_adult: bool,
    pub original_language: Choice,
    pub status: Choice,
    pub show_type: Choice,
    pub with_cast: String,
    pub with_crew: String,
    pub with_companies: String,
    pub with_networks: String,
    pub with_keywords: String,
    pub is_filters_active: bool,
}

/// Wire form of [`FilterState`] with every field optional
#[derive(Default, Deserialize)]
#[serde(default)]
struct PartialFilterState {
    context: Option<ContentContext>,
    rating: Option<f64>,
    genre: Option<GenreFilter>,
    #[serde(deserialize_with = "optional_date")]
    date_start: Option<NaiveDate>,
    #[serde(deserialize_with = "optional_date")]
    date_end: Option<NaiveDate>,
    popularity: Option<f64>,
    vote_count: Option<u32>,
    sort_by: Option<SortKey>,
    include_adult: Option<bool>,
    original_language: Option<Choice>,
    status: Option<Choice>,
    show_type: Option<Choice>,
    with_cast: Option<String>,
    with_crew: Option<String>,
    with_companies: Option<String>,
    with_networks: Option<String>,
    with_keywords: Option<String>,
    is_filters_active: Option<bool>,
}

impl From<PartialFilterState> for FilterState {
    fn from(partial: PartialFilterState) -> Self {
        let defaults = FilterState::defaults(partial.context.unwrap_or(ContentContext::Generic));
        Self {
            context: defaults.context,
            rating: partial.rating.unwrap_or(defaults.rating),
            genre: partial.genre.unwrap_or(defaults.genre),
            date_start: partial.date_start.or(defaults.date_start),
            date_end: partial.date_end.or(defaults.date_end),
            popularity: partial.popularity.unwrap_or(defaults.popularity),
            vote_count: partial.vote_count.unwrap_or(defaults.vote_count),
            sort_by: partial.sort_by.unwrap_or(defaults.sort_by),
            include_adult: partial.include_adult.unwrap_or(defaults.include_adult),
            original_language: partial
                .original_language
                .unwrap_or(defaults.original_language),
            status: partial.status.unwrap_or(defaults.status),
            show_type: partial.show_type.unwrap_or(defaults.show_type),
            with_cast: partial.with_cast.unwrap_or(defaults.with_cast),
            with_crew: partial.with_crew.unwrap_or(defaults.with_crew),
            with_companies: partial.with_companies.unwrap_or(defaults.with_companies),
            with_networks: partial.with_networks.unwrap_or(defaults.with_networks),
            with_keywords: partial.with_keywords.unwrap_or(defaults.with_keywords),
            is_filters_active: partial.is_filters_active.unwrap_or(defaults.is_filters_active),
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::defaults(ContentContext::Generic)
    }
}

impl FilterState {
    /// Documented defaults for a context; nothing active
    pub fn defaults(context: ContentContext) -> Self {
        Self {
            context,
            rating: 0.0,
            genre: GenreFilter::All,
            date_start: None,
            date_end: None,
            popularity: 0.0,
            vote_count: 0,
            sort_by: context.default_sort(),
            include_adult: false,
            original_language: Choice::All,
            status: Choice::All,
            show_type: Choice::All,
            with_cast: String::new(),
            with_crew: String::new(),
            with_companies: String::new(),
            with_networks: String::new(),
            with_keywords: String::new(),
            is_filters_active: false,
        }
    }

    pub fn has_date_bound(&self) -> bool {
        self.date_start.is_some() || self.date_end.is_some()
    }
}

/// Typed facet rejection, raised at the input boundary
#[derive(Debug, Error, PartialEq)]
pub enum FacetError {
    #[error("{facet} is not available for {context} content")]
    Unsupported {
        facet: FacetKind,
        context: ContentContext,
    },

    #[error("sort order {key} is not available for {context} content")]
    UnsupportedSort {
        key: SortKey,
        context: ContentContext,
    },

    #[error("invalid {facet} value: {reason}")]
    OutOfDomain { facet: FacetKind, reason: String },
}

/// A single facet assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "facet", content = "value", rename_all = "snake_case")]
pub enum FacetUpdate {
    Rating(f64),
    Genre(GenreFilter),
    /// Shorthand for a date range covering one calendar year; `null` clears it
    Year(Option<i32>),
    DateRange {
        #[serde(default, deserialize_with = "optional_date")]
        start: Option<NaiveDate>,
        #[serde(default, deserialize_with = "optional_date")]
        end: Option<NaiveDate>,
    },
    Popularity(f64),
    VoteCount(u32),
    IncludeAdult(bool),
    OriginalLanguage(Choice),
    Status(Choice),
    ShowType(Choice),
    WithCast(String),
    WithCrew(String),
    WithCompanies(String),
    WithNetworks(String),
    WithKeywords(String),
}

impl FacetUpdate {
    pub fn facet(&self) -> FacetKind {
        match self {
            FacetUpdate::Rating(_) => FacetKind::Rating,
            FacetUpdate::Genre(_) => FacetKind::Genre,
            FacetUpdate::Year(_) | FacetUpdate::DateRange { .. } => FacetKind::DateRange,
            FacetUpdate::Popularity(_) => FacetKind::Popularity,
            FacetUpdate::VoteCount(_) => FacetKind::VoteCount,
            FacetUpdate::IncludeAdult(_) => FacetKind::IncludeAdult,
            FacetUpdate::OriginalLanguage(_) => FacetKind::OriginalLanguage,
            FacetUpdate::Status(_) => FacetKind::Status,
            FacetUpdate::ShowType(_) => FacetKind::ShowType,
            FacetUpdate::WithCast(_) => FacetKind::WithCast,
            FacetUpdate::WithCrew(_) => FacetKind::WithCrew,
            FacetUpdate::WithCompanies(_) => FacetKind::WithCompanies,
            FacetUpdate::WithNetworks(_) => FacetKind::WithNetworks,
            FacetUpdate::WithKeywords(_) => FacetKind::WithKeywords,
        }
    }

    /// Checks the value against the facet's domain and the context's facet list
    pub fn validate(&self, context: ContentContext) -> Result<(), FacetError> {
        let facet = self.facet();
        if !context.supports(facet) {
            return Err(FacetError::Unsupported { facet, context });
        }

        let out_of_domain = |reason: String| Err(FacetError::OutOfDomain { facet, reason });

        match self {
            FacetUpdate::Rating(rating) => {
                if !(0.0..=10.0).contains(rating) {
                    return out_of_domain(format!("{} is outside 0 to 10", rating));
                }
                if (rating * 2.0).fract() != 0.0 {
                    return out_of_domain(format!("{} is not a multiple of 0.5", rating));
                }
            }
            FacetUpdate::Popularity(popularity) => {
                if !popularity.is_finite() || *popularity < 0.0 {
                    return out_of_domain(format!("{} must be a finite value >= 0", popularity));
                }
            }
            FacetUpdate::Year(Some(year)) => {
                if year_bounds(*year).is_none() {
                    return out_of_domain(format!("{} is not a calendar year", year));
                }
            }
            FacetUpdate::DateRange {
                start: Some(start),
                end: Some(end),
            } if start > end => {
                return out_of_domain(format!("start {} is after end {}", start, end));
            }
            _ => {}
        }

        Ok(())
    }
}

/// Checks a sort key against the context's sort vocabulary
pub fn validate_sort(context: ContentContext, key: SortKey) -> Result<(), FacetError> {
    if context.supports_sort(key) {
        Ok(())
    } else {
        Err(FacetError::UnsupportedSort { key, context })
    }
}

fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// Single source of truth for one context's facet values and sort order
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStore {
    state: FilterState,
}

impl FilterStore {
    pub fn new(context: ContentContext) -> Self {
        Self {
            state: FilterState::defaults(context),
        }
    }

    /// Rebuilds a store from a previously taken snapshot
    pub fn restore(state: FilterState) -> Self {
        Self { state }
    }

    pub fn context(&self) -> ContentContext {
        self.state.context
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn snapshot(&self) -> FilterState {
        self.state.clone()
    }

    /// Stores a facet value and marks filtering active
    ///
    /// Values are taken as given; domain checks belong to
    /// [`FacetUpdate::validate`] at the input boundary.
    pub fn set_facet(&mut self, update: FacetUpdate) {
        let state = &mut self.state;
        match update {
            FacetUpdate::Rating(rating) => state.rating = rating,
            FacetUpdate::Genre(genre) => state.genre = genre,
            FacetUpdate::Year(year) => {
                let bounds = year.and_then(year_bounds);
                state.date_start = bounds.map(|(start, _)| start);
                state.date_end = bounds.map(|(_, end)| end);
            }
            FacetUpdate::DateRange { start, end } => {
                state.date_start = start;
                state.date_end = end;
            }
            FacetUpdate::Popularity(popularity) => state.popularity = popularity,
            FacetUpdate::VoteCount(count) => state.vote_count = count,
            FacetUpdate::IncludeAdult(include) => state.include_adult = include,
            FacetUpdate::OriginalLanguage(language) => state.original_language = language,
            FacetUpdate::Status(status) => state.status = status,
            FacetUpdate::ShowType(show_type) => state.show_type = show_type,
            FacetUpdate::WithCast(cast) => state.with_cast = cast,
            FacetUpdate::WithCrew(crew) => state.with_crew = crew,
            FacetUpdate::WithCompanies(companies) => state.with_companies = companies,
            FacetUpdate::WithNetworks(networks) => state.with_networks = networks,
            FacetUpdate::WithKeywords(keywords) => state.with_keywords = keywords,
        }
        state.is_filters_active = true;
    }

    /// Sorting is orthogonal to filtering: the active flag is left alone
    pub fn set_sort_order(&mut self, key: SortKey) {
        self.state.sort_by = key;
    }

    pub fn reset(&mut self) {
        self.state = FilterState::defaults(self.state.context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_defaults() {
        let store = FilterStore::new(ContentContext::Generic);
        let state = store.state();
        assert_eq!(state.rating, 0.0);
        assert_eq!(state.genre, GenreFilter::All);
        assert_eq!(state.sort_by, SortKey::Default);
        assert!(!state.include_adult);
        assert_eq!(state.original_language, Choice::All);
        assert!(!state.is_filters_active);
    }

    #[test]
    fn test_set_genre_then_reset() {
        let mut store = FilterStore::new(ContentContext::Generic);
        let genre: GenreFilter = serde_json::from_str("\"28\"").unwrap();
        store.set_facet(FacetUpdate::Genre(genre));
        assert_eq!(store.state().genre, GenreFilter::Id(28));
        assert!(store.state().is_filters_active);

        store.reset();
        assert_eq!(store.state().genre, GenreFilter::All);
        assert!(!store.state().is_filters_active);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut store = FilterStore::new(ContentContext::Tv);
        store.set_facet(FacetUpdate::Status(Choice::only("Ended")));
        store.set_sort_order(SortKey::TitleAsc);

        store.reset();
        let once = store.snapshot();
        store.reset();
        assert_eq!(store.snapshot(), once);
        assert_eq!(once, FilterState::defaults(ContentContext::Tv));
    }

    #[test]
    fn test_sort_order_does_not_activate_filters() {
        let mut store = FilterStore::new(ContentContext::Movie);
        store.set_sort_order(SortKey::RatingAsc);
        assert_eq!(store.state().sort_by, SortKey::RatingAsc);
        assert!(!store.state().is_filters_active);
    }

    #[test]
    fn test_setting_default_value_still_activates() {
        let mut store = FilterStore::new(ContentContext::Generic);
        store.set_facet(FacetUpdate::Rating(0.0));
        assert!(store.state().is_filters_active);
    }

    #[test]
    fn test_year_sets_full_calendar_range() {
        let mut store = FilterStore::new(ContentContext::Movie);
        store.set_facet(FacetUpdate::Year(Some(1999)));
        assert_eq!(store.state().date_start, NaiveDate::from_ymd_opt(1999, 1, 1));
        assert_eq!(store.state().date_end, NaiveDate::from_ymd_opt(1999, 12, 31));

        store.set_facet(FacetUpdate::Year(None));
        assert!(!store.state().has_date_bound());
    }

    #[test]
    fn test_validate_rating_domain() {
        let ctx = ContentContext::Generic;
        assert!(FacetUpdate::Rating(7.5).validate(ctx).is_ok());
        assert!(FacetUpdate::Rating(10.0).validate(ctx).is_ok());
        assert!(matches!(
            FacetUpdate::Rating(-1.0).validate(ctx),
            Err(FacetError::OutOfDomain { facet: FacetKind::Rating, .. })
        ));
        assert!(FacetUpdate::Rating(7.3).validate(ctx).is_err());
    }

    #[test]
    fn test_validate_rejects_facet_outside_context() {
        let err = FacetUpdate::IncludeAdult(true)
            .validate(ContentContext::Tv)
            .unwrap_err();
        assert_eq!(
            err,
            FacetError::Unsupported {
                facet: FacetKind::IncludeAdult,
                context: ContentContext::Tv
            }
        );
        assert_eq!(err.to_string(), "include_adult is not available for tv content");
    }

    #[test]
    fn test_validate_date_range_order() {
        let update = FacetUpdate::DateRange {
            start: NaiveDate::from_ymd_opt(2021, 1, 1),
            end: NaiveDate::from_ymd_opt(2020, 1, 1),
        };
        assert!(update.validate(ContentContext::Generic).is_err());

        let open_ended = FacetUpdate::DateRange {
            start: NaiveDate::from_ymd_opt(2021, 1, 1),
            end: None,
        };
        assert!(open_ended.validate(ContentContext::Generic).is_ok());
    }

    #[test]
    fn test_validate_popularity_and_sort() {
        assert!(FacetUpdate::Popularity(f64::NAN)
            .validate(ContentContext::Generic)
            .is_err());
        assert!(validate_sort(ContentContext::Generic, SortKey::FirstAirDateAsc).is_err());
        assert!(validate_sort(ContentContext::Tv, SortKey::FirstAirDateAsc).is_ok());
    }

    #[test]
    fn test_facet_update_wire_format() {
        let update: FacetUpdate =
            serde_json::from_str(r#"{"facet": "with_cast", "value": "tom"}"#).unwrap();
        assert_eq!(update, FacetUpdate::WithCast("tom".to_string()));

        let update: FacetUpdate = serde_json::from_str(
            r#"{"facet": "date_range", "value": {"start": "2020-01-01", "end": ""}}"#,
        )
        .unwrap();
        assert_eq!(
            update,
            FacetUpdate::DateRange {
                start: NaiveDate::from_ymd_opt(2020, 1, 1),
                end: None
            }
        );

        let update: FacetUpdate =
            serde_json::from_str(r#"{"facet": "genre", "value": 18}"#).unwrap();
        assert_eq!(update, FacetUpdate::Genre(GenreFilter::Id(18)));
    }

    #[test]
    fn test_genre_rejects_garbage() {
        let result: Result<GenreFilter, _> = serde_json::from_str("\"action\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_state_uses_defaults() {
        let state: FilterState = serde_json::from_str(
            r#"{"rating": 6.5, "genre": "all", "date_start": "", "is_filters_active": true}"#,
        )
        .unwrap();
        assert_eq!(state.context, ContentContext::Generic);
        assert_eq!(state.rating, 6.5);
        assert_eq!(state.date_start, None);
        assert_eq!(state.sort_by, SortKey::Default);
        assert!(state.is_filters_active);
    }

    #[test]
    fn test_partial_state_takes_defaults_of_its_context() {
        let state: FilterState = serde_json::from_str(r#"{"context": "movie"}"#).unwrap();
        assert_eq!(state, FilterState::defaults(ContentContext::Movie));
        assert_eq!(state.sort_by, SortKey::PopularityDesc);

        let state: FilterState =
            serde_json::from_str(r#"{"context": "tv", "sort_by": "title-asc"}"#).unwrap();
        assert_eq!(state.sort_by, SortKey::TitleAsc);
        assert!(!state.is_filters_active);
    }

    #[test]
    fn test_snapshot_survives_json() {
        let mut store = FilterStore::new(ContentContext::Tv);
        store.set_facet(FacetUpdate::Status(Choice::only("Ended")));
        store.set_sort_order(SortKey::DateAsc);
        let json = serde_json::to_string(store.state()).unwrap();

        let state: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(&state, store.state());
    }

    #[test]
    fn test_choice_round_trips_all_sentinel() {
        assert_eq!(String::from(Choice::All), "all");
        assert_eq!(Choice::only("  "), Choice::All);
        assert_eq!(Choice::only("ja"), Choice::Only("ja".to_string()));
    }
}
