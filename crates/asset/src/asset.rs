//! Asset handle and its load state machine.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::{Rc, Weak},
};

use corelib::{Channel, Subscription};

use crate::data::AssetData;

/// Kind of resource; part of an asset's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetType {
    Image,
    Audio,
    Text,
    Binary,
}

/// Registry identity of an asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub asset_type: AssetType,
    pub name: String,
}

impl AssetKey {
    pub fn new(asset_type: AssetType, name: impl Into<String>) -> Self {
        Self {
            asset_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.asset_type, self.name)
    }
}

/// `Unresolved -> Loading -> Loaded`, or `Loading -> Failed`. `Loaded` and `Failed` are final.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Unresolved,
    Loading,
    Loaded,
    Failed,
}

pub(crate) type LoadQueue = RefCell<VecDeque<Asset>>;

struct AssetInner {
    key: AssetKey,
    /// Source path; `None` marks the placeholder that stands in for a missing asset.
    path: Option<String>,
    state: Cell<LoadState>,
    data: RefCell<Option<Rc<AssetData>>>,
    loaded: Channel<Asset>,
    queue: Weak<LoadQueue>,
}

/// Shared handle to one registered resource. Clones compare equal.
#[derive(Clone)]
pub struct Asset {
    inner: Rc<AssetInner>,
}

impl Asset {
    pub(crate) fn registered(key: AssetKey, path: String, queue: Weak<LoadQueue>) -> Self {
        Self::build(key, Some(path), queue)
    }

    /// Stand-in for an asset the loader does not know yet. Never loads.
    pub fn placeholder(key: AssetKey) -> Self {
        Self::build(key, None, Weak::new())
    }

    fn build(key: AssetKey, path: Option<String>, queue: Weak<LoadQueue>) -> Self {
        Self {
            inner: Rc::new(AssetInner {
                key,
                path,
                state: Cell::new(LoadState::Unresolved),
                data: RefCell::new(None),
                loaded: Channel::new(),
                queue,
            }),
        }
    }

    pub fn key(&self) -> &AssetKey {
        &self.inner.key
    }

    pub fn asset_type(&self) -> AssetType {
        self.inner.key.asset_type
    }

    pub fn name(&self) -> &str {
        &self.inner.key.name
    }

    pub fn path(&self) -> Option<&str> {
        self.inner.path.as_deref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.inner.path.is_none()
    }

    pub fn state(&self) -> LoadState {
        self.inner.state.get()
    }

    pub fn loaded(&self) -> bool {
        self.state() == LoadState::Loaded
    }

    pub fn data(&self) -> Option<Rc<AssetData>> {
        self.inner.data.borrow().clone()
    }

    /// Start loading. No-op unless the asset is still unresolved.
    pub fn load(&self) {
        if self.is_placeholder() || self.state() != LoadState::Unresolved {
            return;
        }
        self.inner.state.set(LoadState::Loading);
        match self.inner.queue.upgrade() {
            Some(queue) => {
                queue.borrow_mut().push_back(self.clone());
                log::debug!("Queued asset {}", self.key());
            }
            None => log::warn!("Asset {} outlived its loader; load will not run", self.key()),
        }
    }

    /// Complete the load with decoded `data` and notify observers once.
    ///
    /// Returns `false` when the asset already settled or is a placeholder.
    pub fn finish(&self, data: AssetData) -> bool {
        if self.is_placeholder() {
            log::warn!("Ignoring data for placeholder asset {}", self.key());
            return false;
        }
        if matches!(self.state(), LoadState::Loaded | LoadState::Failed) {
            return false;
        }
        *self.inner.data.borrow_mut() = Some(Rc::new(data));
        self.inner.state.set(LoadState::Loaded);
        log::debug!("Asset {} loaded", self.key());
        self.inner.loaded.emit(self);
        true
    }

    /// Mark the load as failed. The asset never reports loaded afterwards.
    pub fn fail(&self, error: &anyhow::Error) {
        if self.loaded() || self.is_placeholder() {
            return;
        }
        self.inner.state.set(LoadState::Failed);
        log::error!("Asset {} failed to load: {:#}", self.key(), error);
    }

    /// Observe the one-time load completion.
    pub fn on_loaded(&self, handler: impl Fn(&Asset) + 'static) -> Subscription {
        self.inner.loaded.subscribe(handler)
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Asset {}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("key", &self.inner.key)
            .field("path", &self.inner.path)
            .field("state", &self.state())
            .finish()
    }
}
