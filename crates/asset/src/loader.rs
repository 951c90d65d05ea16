//! Asset registry. Emits `Add` when an asset is registered and `Load` when one finishes.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    fmt,
    path::Path,
    rc::{Rc, Weak},
};

use anyhow::{Context, Result};
use corelib::{Channel, Subscription};

use crate::{
    asset::{Asset, AssetKey, AssetType, LoadQueue, LoadState},
    data::AssetData,
    source::AssetSource,
};

/// Loader-wide notifications; handlers receive the asset that changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderEvent {
    Add,
    Load,
}

struct Registered {
    asset: Asset,
    /// Forwards the asset's own completion to the loader's `Load` event.
    _forward: Subscription,
}

struct LoaderInner {
    assets: RefCell<HashMap<AssetKey, Registered>>,
    queue: Rc<LoadQueue>,
    source: Option<Box<dyn AssetSource>>,
    added: Channel<Asset>,
    loaded: Channel<Asset>,
}

/// Shared handle to the asset registry.
#[derive(Clone)]
pub struct Loader {
    inner: Rc<LoaderInner>,
}

impl Loader {
    /// Loader without a byte source; queued assets wait for [`Asset::finish`].
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_source(source: impl AssetSource + 'static) -> Self {
        Self::build(Some(Box::new(source)))
    }

    fn build(source: Option<Box<dyn AssetSource>>) -> Self {
        Self {
            inner: Rc::new(LoaderInner {
                assets: RefCell::new(HashMap::new()),
                queue: Rc::new(RefCell::new(VecDeque::new())),
                source,
                added: Channel::new(),
                loaded: Channel::new(),
            }),
        }
    }

    /// Register `name` of `asset_type` at `path`. Known keys return the existing asset.
    pub fn add(&self, asset_type: AssetType, name: &str, path: impl Into<String>) -> Asset {
        let key = AssetKey::new(asset_type, name);
        if let Some(existing) = self.get_key(&key) {
            log::debug!("Asset {} already registered", key);
            return existing;
        }

        let asset = Asset::registered(key.clone(), path.into(), Rc::downgrade(&self.inner.queue));
        let weak: Weak<LoaderInner> = Rc::downgrade(&self.inner);
        let forward = asset.on_loaded(move |asset| {
            if let Some(inner) = weak.upgrade() {
                inner.loaded.emit(asset);
            }
        });
        self.inner.assets.borrow_mut().insert(
            key,
            Registered {
                asset: asset.clone(),
                _forward: forward,
            },
        );
        log::debug!("Registered asset {}", asset.key());
        self.inner.added.emit(&asset);
        asset
    }

    pub fn get(&self, asset_type: AssetType, name: &str) -> Option<Asset> {
        self.get_key(&AssetKey::new(asset_type, name))
    }

    pub fn get_key(&self, key: &AssetKey) -> Option<Asset> {
        self.inner
            .assets
            .borrow()
            .get(key)
            .map(|registered| registered.asset.clone())
    }

    /// Subscribe to a loader-wide event. Handlers filter by asset themselves.
    pub fn on(&self, event: LoaderEvent, handler: impl Fn(&Asset) + 'static) -> Subscription {
        match event {
            LoaderEvent::Add => self.inner.added.subscribe(handler),
            LoaderEvent::Load => self.inner.loaded.subscribe(handler),
        }
    }

    /// Number of handlers attached to `event`.
    pub fn listeners(&self, event: LoaderEvent) -> usize {
        match event {
            LoaderEvent::Add => self.inner.added.len(),
            LoaderEvent::Load => self.inner.loaded.len(),
        }
    }

    /// Queue every asset registered but not started yet.
    pub fn load_all(&self) {
        let unresolved: Vec<Asset> = self
            .inner
            .assets
            .borrow()
            .values()
            .map(|registered| registered.asset.clone())
            .filter(|asset| asset.state() == LoadState::Unresolved)
            .collect();
        log::info!("Loading {} registered assets", unresolved.len());
        for asset in unresolved {
            asset.load();
        }
    }

    /// Run queued loads through the source. Returns how many assets finished.
    ///
    /// Assets queued by handlers during this call are processed in the same call.
    pub fn poll(&self) -> usize {
        let Some(source) = self.inner.source.as_deref() else {
            return 0;
        };
        let mut finished = 0;
        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(asset) = next else {
                break;
            };
            if asset.state() != LoadState::Loading {
                continue;
            }
            match read_asset(source, &asset) {
                Ok(data) => {
                    if asset.finish(data) {
                        finished += 1;
                    }
                }
                Err(err) => asset.fail(&err),
            }
        }
        finished
    }

    /// Registered assets still loading.
    pub fn pending(&self) -> usize {
        self.inner
            .assets
            .borrow()
            .values()
            .filter(|registered| registered.asset.state() == LoadState::Loading)
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.assets.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("assets", &self.len())
            .field("queued", &self.inner.queue.borrow().len())
            .field("has_source", &self.inner.source.is_some())
            .finish()
    }
}

fn read_asset(source: &dyn AssetSource, asset: &Asset) -> Result<AssetData> {
    let path = asset.path().unwrap_or_default();
    let bytes = source
        .read(Path::new(path))
        .with_context(|| format!("Failed to read asset {} from '{}'", asset.key(), path))?;
    AssetData::decode(asset.asset_type(), bytes)
        .with_context(|| format!("Failed to decode asset {}", asset.key()))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{source::MemorySource, texture::tests::png_bytes};

    #[test]
    fn add_emits_once_per_key() {
        let loader = Loader::new();
        let added = Rc::new(Cell::new(0));
        let _sub = {
            let added = added.clone();
            loader.on(LoaderEvent::Add, move |_| added.set(added.get() + 1))
        };
        let a = loader.add(AssetType::Image, "tex", "tex.png");
        let b = loader.add(AssetType::Image, "tex", "other.png");
        assert_eq!(a, b);
        assert_eq!(added.get(), 1);
        assert_eq!(loader.get(AssetType::Image, "tex"), Some(a));
        assert_eq!(loader.get(AssetType::Audio, "tex"), None);
    }

    #[test]
    fn asset_completion_is_forwarded_to_load_event() {
        let loader = Loader::new();
        let asset = loader.add(AssetType::Binary, "blob", "blob.bin");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            loader.on(LoaderEvent::Load, move |asset| {
                seen.borrow_mut().push(asset.name().to_owned())
            })
        };
        asset.finish(AssetData::Binary(vec![0]));
        assert_eq!(*seen.borrow(), vec!["blob".to_owned()]);
    }

    #[test]
    fn poll_reads_and_decodes_queued_assets() {
        let source = MemorySource::new()
            .with("hero.png", png_bytes(2, 2))
            .with("intro.txt", "welcome");
        let loader = Loader::with_source(source);
        let hero = loader.add(AssetType::Image, "hero", "hero.png");
        let intro = loader.add(AssetType::Text, "intro", "intro.txt");
        assert_eq!(loader.poll(), 0);

        loader.load_all();
        assert_eq!(loader.pending(), 2);
        assert_eq!(loader.poll(), 2);
        assert_eq!(loader.pending(), 0);
        assert!(hero.loaded() && intro.loaded());
        assert_eq!(hero.data().unwrap().as_texture().unwrap().width, 2);
        assert_eq!(intro.data().unwrap().as_text(), Some("welcome"));
    }

    #[test]
    fn missing_file_fails_without_load_event() {
        let loader = Loader::with_source(MemorySource::new());
        let asset = loader.add(AssetType::Binary, "ghost", "ghost.bin");
        let fired = Rc::new(Cell::new(false));
        let _sub = {
            let fired = fired.clone();
            loader.on(LoaderEvent::Load, move |_| fired.set(true))
        };
        asset.load();
        assert_eq!(loader.poll(), 0);
        assert_eq!(asset.state(), LoadState::Failed);
        assert!(!fired.get());
    }

    #[test]
    fn sourceless_loader_leaves_queue_pending() {
        let loader = Loader::new();
        let asset = loader.add(AssetType::Audio, "theme", "theme.ogg");
        asset.load();
        assert_eq!(loader.poll(), 0);
        assert_eq!(loader.pending(), 1);
        asset.finish(AssetData::Audio(vec![9]));
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let loader = Loader::new();
        let sub = loader.on(LoaderEvent::Load, |_| {});
        assert_eq!(loader.listeners(LoaderEvent::Load), 1);
        drop(sub);
        assert_eq!(loader.listeners(LoaderEvent::Load), 0);
    }
}
