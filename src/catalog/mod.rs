pub mod channels;
pub mod favorites;
pub mod guide;
pub mod recents;
pub mod types;

pub use channels::{ChannelCatalogCache, DEFAULT_CATALOG_TTL};
pub use favorites::FavoritesStore;
pub use guide::{ProgramGuideCache, DEFAULT_GUIDE_TTL};
pub use recents::{RecencyStore, DEFAULT_RECENTS_CAPACITY};
pub use types::{Catalog, Category, Channel, EpgProgram, MediaId, MediaItem, Movie, Series};
