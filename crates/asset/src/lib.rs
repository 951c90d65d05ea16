//! Asset registry and loading.
//! Assets are identified by (type, name), loaded through an [`AssetSource`] and report
//! completion once through the [`Loader`]'s `Load` event.

pub mod asset;
pub mod data;
pub mod loader;
pub mod source;
pub mod texture;

pub use asset::{Asset, AssetKey, AssetType, LoadState};
pub use data::AssetData;
pub use loader::{Loader, LoaderEvent};
pub use source::{AssetSource, FileSource, MemorySource, SourceError};
pub use texture::{TextureData, TextureFormat};
