//! Persisted, observable stores.
//!
//! [`StorageStore`] bridges one persisted slot to many subscribers. The
//! specialized stores wrap it with a reducer and a typed view:
//! [`RecencyList`] and [`FavoriteSet`] here, and
//! [`ThemeStore`](crate::theme::ThemeStore) in the theme module.

mod codec;
mod favorites;
mod recent;
mod store;

pub use codec::{decode_ids, encode_ids};
pub use favorites::{toggle_id, FavoriteSet};
pub use recent::{push_recent, RecencyList, DEFAULT_RECENT_LIMIT};
pub use store::{Snapshot, StorageStore};
