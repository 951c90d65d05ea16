//! Entity bound to one named asset.
//!
//! Resolution paths:
//! - asset registered and loaded: resolved during construction;
//! - asset registered, still loading: waits on the loader's `Load` event for that asset,
//!   and starts the load itself if the engine is already running;
//! - asset unknown: holds a placeholder and waits on the loader's `Add` event, then
//!   takes one of the two paths above.
//!
//! The entity fires its own `loaded` event exactly once and drops its loader subscription
//! before doing so.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use asset::{Asset, AssetKey, AssetType, LoaderEvent};
use corelib::{Channel, Subscription};

use crate::{
    engine::Engine,
    entity::{Entity, EntityId, EntityOptions, Node},
    hooks::HookKind,
};

pub(crate) struct AssetEntityInner {
    node: Node,
    key: AssetKey,
    asset: RefCell<Asset>,
    engine: Rc<Engine>,
    /// Either the `Add` or the `Load` subscription, never both.
    loader_sub: RefCell<Option<Subscription>>,
    resolved: Cell<bool>,
    loaded: Channel<AssetEntity>,
}

#[derive(Clone)]
pub struct AssetEntity {
    inner: Rc<AssetEntityInner>,
}

impl AssetEntity {
    pub fn new(
        engine: &Rc<Engine>,
        asset_type: AssetType,
        name: &str,
        options: impl Into<EntityOptions>,
    ) -> Self {
        let key = AssetKey::new(asset_type, name);
        let entity = Self {
            inner: Rc::new(AssetEntityInner {
                node: Node::new(options.into()),
                asset: RefCell::new(Asset::placeholder(key.clone())),
                key,
                engine: engine.clone(),
                loader_sub: RefCell::new(None),
                resolved: Cell::new(false),
                loaded: Channel::new(),
            }),
        };

        match engine.loader().get_key(&entity.inner.key) {
            Some(asset) => entity.attach(asset),
            None => {
                log::debug!("Asset {} not registered yet, waiting", entity.inner.key);
                entity.wait_for_registration();
            }
        }
        entity
    }

    fn from_weak(weak: &Weak<AssetEntityInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn node(&self) -> &Node {
        &self.inner.node
    }

    pub fn id(&self) -> EntityId {
        self.inner.node.id
    }

    pub fn key(&self) -> &AssetKey {
        &self.inner.key
    }

    /// Current asset; a placeholder until the loader knows the key.
    pub fn asset(&self) -> Asset {
        self.inner.asset.borrow().clone()
    }

    pub fn has_asset(&self) -> bool {
        !self.inner.asset.borrow().is_placeholder()
    }

    pub fn loaded(&self) -> bool {
        self.inner.asset.borrow().loaded()
    }

    /// `true` once the `loaded` event has fired.
    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.get()
    }

    /// `true` while a loader subscription is held.
    pub fn is_waiting(&self) -> bool {
        self.inner.loader_sub.borrow().is_some()
    }

    /// Observe the one-time resolution of this entity's asset.
    pub fn on_loaded(&self, handler: impl Fn(&AssetEntity) + 'static) -> Subscription {
        self.inner.loaded.subscribe(handler)
    }

    /// Number of handlers observing `loaded`.
    pub fn listeners(&self) -> usize {
        self.inner.loaded.len()
    }

    /// Stop listening to the loader. The entity stays in whatever state it reached.
    pub fn detach(&self) {
        self.set_loader_sub(None);
    }

    /// Listen to the loader again after [`AssetEntity::detach`], unless already resolved.
    pub(crate) fn reattach(&self) {
        if self.is_resolved() || self.is_waiting() {
            return;
        }
        log::debug!("Reattaching asset entity {} to {}", self.id(), self.inner.key);
        let asset = self.asset();
        if !asset.is_placeholder() {
            self.attach(asset);
            return;
        }
        match self.inner.engine.loader().get_key(&self.inner.key) {
            Some(asset) => self.attach(asset),
            None => self.wait_for_registration(),
        }
    }

    fn set_loader_sub(&self, sub: Option<Subscription>) {
        let previous = self.inner.loader_sub.replace(sub);
        drop(previous);
    }

    fn attach(&self, asset: Asset) {
        *self.inner.asset.borrow_mut() = asset.clone();
        if asset.loaded() {
            self.resolve();
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let sub = self.inner.engine.loader().on(LoaderEvent::Load, move |loaded| {
            let Some(entity) = AssetEntity::from_weak(&weak) else {
                return;
            };
            if *loaded == entity.asset() {
                entity.resolve();
            }
        });
        self.set_loader_sub(Some(sub));

        if self.inner.engine.started() {
            asset.load();
        }
    }

    fn wait_for_registration(&self) {
        let weak = Rc::downgrade(&self.inner);
        let sub = self.inner.engine.loader().on(LoaderEvent::Add, move |added| {
            let Some(entity) = AssetEntity::from_weak(&weak) else {
                return;
            };
            if added.key() == entity.key() {
                log::debug!("Asset {} registered, binding", added.key());
                entity.attach(added.clone());
            }
        });
        self.set_loader_sub(Some(sub));
    }

    fn resolve(&self) {
        if self.inner.resolved.replace(true) {
            return;
        }
        self.set_loader_sub(None);
        log::debug!("Asset entity {} resolved {}", self.id(), self.inner.key);

        let entity = Entity::Asset(self.clone());
        self.inner.node.call(HookKind::Load, &entity);
        self.inner.loaded.emit(self);
    }
}

impl PartialEq for AssetEntity {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AssetEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetEntity")
            .field("id", &self.id())
            .field("key", &self.inner.key)
            .field("loaded", &self.loaded())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use asset::{AssetData, LoadState, Loader};
    use corelib::EntityConfig;

    use super::*;
    use crate::hooks::Hooks;

    fn engine() -> Rc<Engine> {
        Engine::new(Loader::new())
    }

    fn counter(entity: &AssetEntity) -> (Rc<Cell<u32>>, Subscription) {
        let hits = Rc::new(Cell::new(0));
        let sub = {
            let hits = hits.clone();
            entity.on_loaded(move |_| hits.set(hits.get() + 1))
        };
        (hits, sub)
    }

    #[test]
    fn already_loaded_asset_resolves_immediately() {
        let engine = engine();
        let asset = engine.loader().add(AssetType::Image, "tex", "tex.png");
        asset.finish(AssetData::Binary(Vec::new()));

        let entity = AssetEntity::new(&engine, AssetType::Image, "tex", EntityConfig::default());
        assert!(entity.loaded());
        assert!(entity.is_resolved());
        assert!(!entity.is_waiting());
        assert_eq!(engine.loader().listeners(LoaderEvent::Load), 0);
    }

    #[test]
    fn pending_asset_resolves_on_its_own_load_only() {
        let engine = engine();
        let mine = engine.loader().add(AssetType::Image, "mine", "mine.png");
        let other = engine.loader().add(AssetType::Image, "other", "other.png");
        let entity = AssetEntity::new(&engine, AssetType::Image, "mine", EntityConfig::default());
        let (hits, _sub) = counter(&entity);

        other.finish(AssetData::Binary(Vec::new()));
        assert_eq!(hits.get(), 0);
        assert!(entity.is_waiting());

        mine.finish(AssetData::Binary(Vec::new()));
        assert_eq!(hits.get(), 1);
        assert!(entity.loaded());
        assert!(!entity.is_waiting());
        assert_eq!(engine.loader().listeners(LoaderEvent::Load), 0);
    }

    #[test]
    fn no_eager_load_before_start() {
        let engine = engine();
        let asset = engine.loader().add(AssetType::Audio, "theme", "theme.ogg");
        let _entity = AssetEntity::new(&engine, AssetType::Audio, "theme", EntityConfig::default());
        assert_eq!(asset.state(), LoadState::Unresolved);
    }

    #[test]
    fn eager_load_after_start() {
        let engine = engine();
        engine.start();
        let asset = engine.loader().add(AssetType::Audio, "theme", "theme.ogg");
        let _entity = AssetEntity::new(&engine, AssetType::Audio, "theme", EntityConfig::default());
        assert_eq!(asset.state(), LoadState::Loading);
    }

    #[test]
    fn missing_asset_stays_pending_until_added() {
        let engine = engine();
        let entity = AssetEntity::new(&engine, AssetType::Image, "late", EntityConfig::default());
        let (hits, _sub) = counter(&entity);
        assert!(!entity.has_asset());
        assert!(!entity.loaded());
        assert_eq!(engine.loader().listeners(LoaderEvent::Add), 1);

        engine.loader().add(AssetType::Image, "unrelated", "u.png");
        assert!(!entity.has_asset());

        let asset = engine.loader().add(AssetType::Image, "late", "late.png");
        assert_eq!(entity.asset(), asset);
        assert_eq!(engine.loader().listeners(LoaderEvent::Add), 0);
        assert_eq!(engine.loader().listeners(LoaderEvent::Load), 1);
        assert_eq!(hits.get(), 0);

        asset.finish(AssetData::Binary(Vec::new()));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn late_registration_after_start_loads_eagerly() {
        let engine = engine();
        engine.start();
        let entity = AssetEntity::new(&engine, AssetType::Text, "notes", EntityConfig::default());
        let asset = engine.loader().add(AssetType::Text, "notes", "notes.txt");
        assert_eq!(entity.asset(), asset);
        assert_eq!(asset.state(), LoadState::Loading);
    }

    #[test]
    fn fires_exactly_once() {
        let engine = engine();
        let asset = engine.loader().add(AssetType::Binary, "blob", "blob.bin");
        let entity = AssetEntity::new(&engine, AssetType::Binary, "blob", EntityConfig::default());
        let (hits, _sub) = counter(&entity);
        asset.finish(AssetData::Binary(vec![1]));
        asset.finish(AssetData::Binary(vec![2]));
        entity.resolve();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn load_hook_runs_on_resolution() {
        let engine = engine();
        let asset = engine.loader().add(AssetType::Binary, "blob", "blob.bin");
        let seen = Rc::new(Cell::new(None));
        let hooks = {
            let seen = seen.clone();
            Hooks::new().on_load(move |entity| seen.set(Some(entity.id())))
        };
        let entity = AssetEntity::new(
            &engine,
            AssetType::Binary,
            "blob",
            EntityOptions::new(EntityConfig::default(), hooks),
        );
        assert_eq!(seen.get(), None);
        asset.finish(AssetData::Binary(Vec::new()));
        assert_eq!(seen.get(), Some(entity.id()));
    }

    #[test]
    fn dropping_entity_releases_loader_subscription() {
        let engine = engine();
        let entity = AssetEntity::new(&engine, AssetType::Image, "late", EntityConfig::default());
        assert_eq!(engine.loader().listeners(LoaderEvent::Add), 1);
        drop(entity);
        assert_eq!(engine.loader().listeners(LoaderEvent::Add), 0);
    }
}
