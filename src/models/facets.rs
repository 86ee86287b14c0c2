use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::MediaKind;

/// Filtering context a store and its engine run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentContext {
    /// Mixed movie and TV lists (trending, search results)
    #[serde(rename = "all")]
    Generic,
    Movie,
    Tv,
}

impl Display for ContentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentContext::Generic => write!(f, "all"),
            ContentContext::Movie => write!(f, "movie"),
            ContentContext::Tv => write!(f, "tv"),
        }
    }
}

/// One independently adjustable filter criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    Rating,
    Genre,
    DateRange,
    Popularity,
    VoteCount,
    IncludeAdult,
    OriginalLanguage,
    Status,
    ShowType,
    WithCast,
    WithCrew,
    WithCompanies,
    WithNetworks,
    WithKeywords,
}

impl Display for FacetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FacetKind::Rating => "rating",
            FacetKind::Genre => "genre",
            FacetKind::DateRange => "date_range",
            FacetKind::Popularity => "popularity",
            FacetKind::VoteCount => "vote_count",
            FacetKind::IncludeAdult => "include_adult",
            FacetKind::OriginalLanguage => "original_language",
            FacetKind::Status => "status",
            FacetKind::ShowType => "show_type",
            FacetKind::WithCast => "with_cast",
            FacetKind::WithCrew => "with_crew",
            FacetKind::WithCompanies => "with_companies",
            FacetKind::WithNetworks => "with_networks",
            FacetKind::WithKeywords => "with_keywords",
        };
        write!(f, "{}", name)
    }
}

const GENERIC_FACETS: &[FacetKind] = &[
    FacetKind::Rating,
    FacetKind::Genre,
    FacetKind::DateRange,
    FacetKind::Popularity,
    FacetKind::VoteCount,
];

const MOVIE_FACETS: &[FacetKind] = &[
    FacetKind::Rating,
    FacetKind::Genre,
    FacetKind::DateRange,
    FacetKind::Popularity,
    FacetKind::VoteCount,
    FacetKind::IncludeAdult,
    FacetKind::OriginalLanguage,
    FacetKind::WithCast,
    FacetKind::WithCrew,
    FacetKind::WithCompanies,
    FacetKind::WithKeywords,
];

const TV_FACETS: &[FacetKind] = &[
    FacetKind::Rating,
    FacetKind::Genre,
    FacetKind::DateRange,
    FacetKind::Popularity,
    FacetKind::VoteCount,
    FacetKind::OriginalLanguage,
    FacetKind::Status,
    FacetKind::ShowType,
    FacetKind::WithCast,
    FacetKind::WithCrew,
    FacetKind::WithNetworks,
    FacetKind::WithKeywords,
];

impl ContentContext {
    pub const ALL: [ContentContext; 3] =
        [ContentContext::Generic, ContentContext::Movie, ContentContext::Tv];

    /// Facet descriptor list for this context, in predicate order
    pub fn facets(self) -> &'static [FacetKind] {
        match self {
            ContentContext::Generic => GENERIC_FACETS,
            ContentContext::Movie => MOVIE_FACETS,
            ContentContext::Tv => TV_FACETS,
        }
    }

    pub fn supports(self, facet: FacetKind) -> bool {
        self.facets().contains(&facet)
    }

    /// Sort keys accepted in this context
    pub fn sort_keys(self) -> &'static [SortKey] {
        match self {
            ContentContext::Generic => &SortKey::ALL[..9],
            ContentContext::Movie | ContentContext::Tv => &SortKey::ALL,
        }
    }

    pub fn supports_sort(self, key: SortKey) -> bool {
        self.sort_keys().contains(&key)
    }

    /// Sort order a fresh or reset store starts with
    pub fn default_sort(self) -> SortKey {
        match self {
            ContentContext::Generic => SortKey::Default,
            ContentContext::Movie | ContentContext::Tv => SortKey::PopularityDesc,
        }
    }

    /// Media kind stamped on items that arrive without one
    pub fn media_kind(self) -> Option<MediaKind> {
        match self {
            ContentContext::Generic => None,
            ContentContext::Movie => Some(MediaKind::Movie),
            ContentContext::Tv => Some(MediaKind::Tv),
        }
    }
}

/// Fixed sort vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Default,
    RatingDesc,
    RatingAsc,
    DateDesc,
    DateAsc,
    PopularityDesc,
    PopularityAsc,
    TitleAsc,
    TitleDesc,
    FirstAirDateDesc,
    FirstAirDateAsc,
}

/// Field a sort key orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Rating,
    Date,
    Popularity,
    Title,
}

impl SortKey {
    pub const ALL: [SortKey; 11] = [
        SortKey::Default,
        SortKey::RatingDesc,
        SortKey::RatingAsc,
        SortKey::DateDesc,
        SortKey::DateAsc,
        SortKey::PopularityDesc,
        SortKey::PopularityAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::FirstAirDateDesc,
        SortKey::FirstAirDateAsc,
    ];

    /// Field and direction, or `None` for `default` (no reordering)
    pub fn ordering(self) -> Option<(SortField, bool)> {
        match self {
            SortKey::Default => None,
            SortKey::RatingDesc => Some((SortField::Rating, true)),
            SortKey::RatingAsc => Some((SortField::Rating, false)),
            SortKey::DateDesc | SortKey::FirstAirDateDesc => Some((SortField::Date, true)),
            SortKey::DateAsc | SortKey::FirstAirDateAsc => Some((SortField::Date, false)),
            SortKey::PopularityDesc => Some((SortField::Popularity, true)),
            SortKey::PopularityAsc => Some((SortField::Popularity, false)),
            SortKey::TitleAsc => Some((SortField::Title, false)),
            SortKey::TitleDesc => Some((SortField::Title, true)),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortKey::Default => "default",
            SortKey::RatingDesc => "rating-desc",
            SortKey::RatingAsc => "rating-asc",
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::PopularityDesc => "popularity-desc",
            SortKey::PopularityAsc => "popularity-asc",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
            SortKey::FirstAirDateDesc => "first-air-date-desc",
            SortKey::FirstAirDateAsc => "first-air-date-asc",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_serde_names() {
        assert_eq!(serde_json::to_string(&ContentContext::Generic).unwrap(), "\"all\"");
        assert_eq!(serde_json::to_string(&ContentContext::Tv).unwrap(), "\"tv\"");
        let movie: ContentContext = serde_json::from_str("\"movie\"").unwrap();
        assert_eq!(movie, ContentContext::Movie);
    }

    #[test]
    fn test_generic_context_has_no_content_specific_facets() {
        let generic = ContentContext::Generic;
        assert!(generic.supports(FacetKind::Rating));
        assert!(!generic.supports(FacetKind::IncludeAdult));
        assert!(!generic.supports(FacetKind::WithCast));
    }

    #[test]
    fn test_movie_and_tv_facets_differ() {
        assert!(ContentContext::Movie.supports(FacetKind::IncludeAdult));
        assert!(ContentContext::Movie.supports(FacetKind::WithCompanies));
        assert!(!ContentContext::Movie.supports(FacetKind::Status));

        assert!(ContentContext::Tv.supports(FacetKind::Status));
        assert!(ContentContext::Tv.supports(FacetKind::WithNetworks));
        assert!(!ContentContext::Tv.supports(FacetKind::IncludeAdult));
    }

    #[test]
    fn test_first_air_date_sort_not_in_generic() {
        assert!(!ContentContext::Generic.supports_sort(SortKey::FirstAirDateDesc));
        assert!(ContentContext::Generic.supports_sort(SortKey::TitleDesc));
        assert!(ContentContext::Tv.supports_sort(SortKey::FirstAirDateAsc));
    }

    #[test]
    fn test_sort_key_serde_kebab_case() {
        let key: SortKey = serde_json::from_str("\"first-air-date-desc\"").unwrap();
        assert_eq!(key, SortKey::FirstAirDateDesc);
        assert_eq!(format!("{}", SortKey::RatingDesc), "rating-desc");
    }

    #[test]
    fn test_first_air_date_is_date_comparator() {
        assert_eq!(SortKey::FirstAirDateDesc.ordering(), SortKey::DateDesc.ordering());
        assert_eq!(SortKey::Default.ordering(), None);
    }

    #[test]
    fn test_default_sort_per_context() {
        assert_eq!(ContentContext::Generic.default_sort(), SortKey::Default);
        assert_eq!(ContentContext::Movie.default_sort(), SortKey::PopularityDesc);
    }
}
