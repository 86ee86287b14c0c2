pub mod content;
pub mod facets;
pub mod filter_state;

pub use content::{Associations, CatalogPage, ContentItem, MediaKind};
pub use facets::{ContentContext, FacetKind, SortField, SortKey};
pub use filter_state::{
    validate_sort, Choice, FacetError, FacetUpdate, FilterState, FilterStore, GenreFilter,
};
