pub mod feed;
pub mod filtering;
pub mod session;
pub mod sorting;
pub mod view;

pub use feed::{ContentFeed, FeedStats};
pub use session::{BrowseContext, BrowseSession};
pub use view::FilteredView;
