//! Scene: a container that tracks when every asset below it has loaded.
//!
//! The scene keeps one binding per [`AssetEntity`] in its subtree, keyed by entity id.
//! `asset_count` is the number of bindings and `assets_loaded` the number marked loaded,
//! so `assets_loaded <= asset_count` always holds. Bindings follow structure: adding a
//! subtree anywhere under the scene binds all of its asset entities, removing one unbinds
//! all of them.
//!
//! Readiness is evaluated only after [`Scene::configured`] and then after every change.
//! The first time both counters match, `loaded` flips to `true`, the `load` hook runs and
//! the `loaded` event fires. It never fires again. A scene waiting on an asset that is never
//! registered, or that fails to load, stays unloaded.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use corelib::{Channel, Subscription};

use crate::{
    asset_entity::AssetEntity,
    entity::{Entity, EntityId, EntityOptions},
    group::{Group, GroupInner},
    hooks::HookKind,
};

struct Binding {
    loaded: bool,
    /// Held while waiting for the entity's `loaded` event.
    subscription: Option<Subscription>,
}

#[derive(Default)]
struct TrackerState {
    asset_count: usize,
    assets_loaded: usize,
    loaded: bool,
    active: bool,
    configured: bool,
    destroyed: bool,
    bindings: HashMap<EntityId, Binding>,
}

pub(crate) struct LoadTracker {
    state: RefCell<TrackerState>,
    loaded: Channel<Scene>,
}

impl LoadTracker {
    fn new() -> Self {
        Self {
            state: RefCell::new(TrackerState::default()),
            loaded: Channel::new(),
        }
    }
}

#[derive(Clone)]
pub struct Scene {
    group: Group,
    tracker: Rc<LoadTracker>,
}

impl Scene {
    /// Empty, unconfigured scene. Call [`Scene::configured`] once the initial children are in.
    pub fn new(options: impl Into<EntityOptions>) -> Self {
        let tracker = Rc::new(LoadTracker::new());
        let group = Group::build(options.into(), Some(tracker.clone()));
        Self { group, tracker }
    }

    pub(crate) fn from_group(group: &Group) -> Option<Self> {
        group.inner.tracker.clone().map(|tracker| Self {
            group: group.clone(),
            tracker,
        })
    }

    fn from_weak(weak: &Weak<GroupInner>) -> Option<Self> {
        weak.upgrade()
            .and_then(|inner| Self::from_group(&Group { inner }))
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn id(&self) -> EntityId {
        self.group.id()
    }

    pub fn name(&self) -> Option<&str> {
        self.group.name()
    }

    pub fn children(&self) -> Vec<Entity> {
        self.group.children()
    }

    pub fn add(&self, entity: impl Into<Entity>) -> bool {
        self.group.add(entity)
    }

    pub fn remove(&self, entity: &Entity) -> bool {
        self.group.remove(entity)
    }

    pub fn loaded(&self) -> bool {
        self.tracker.state.borrow().loaded
    }

    pub fn active(&self) -> bool {
        self.tracker.state.borrow().active
    }

    pub fn set_active(&self, active: bool) {
        self.tracker.state.borrow_mut().active = active;
    }

    pub fn asset_count(&self) -> usize {
        self.tracker.state.borrow().asset_count
    }

    pub fn assets_loaded(&self) -> usize {
        self.tracker.state.borrow().assets_loaded
    }

    pub fn is_configured(&self) -> bool {
        self.tracker.state.borrow().configured
    }

    pub fn is_destroyed(&self) -> bool {
        self.tracker.state.borrow().destroyed
    }

    /// End of synchronous construction: readiness may be evaluated from now on.
    ///
    /// A scene with no pending assets becomes loaded right here.
    pub fn configured(&self) {
        {
            let mut state = self.tracker.state.borrow_mut();
            if state.configured {
                return;
            }
            state.configured = true;
        }
        log::debug!(
            "Scene {} configured with {}/{} assets loaded",
            self.label(),
            self.assets_loaded(),
            self.asset_count()
        );
        self.evaluate();
    }

    /// Observe the one-time `loaded` transition.
    pub fn on_loaded(&self, handler: impl Fn(&Scene) + 'static) -> Subscription {
        self.tracker.loaded.subscribe(handler)
    }

    pub fn listeners(&self) -> usize {
        self.tracker.loaded.len()
    }

    pub fn to_entity(&self) -> Entity {
        Entity::Scene(self.clone())
    }

    /// Run destroy hooks and release every subscription held by this scene's tree.
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        self.to_entity().walk(&mut |node| {
            node.call(HookKind::Destroy);
            if let Entity::Asset(asset) = node {
                asset.detach();
            }
        });
        let bindings = {
            let mut state = self.tracker.state.borrow_mut();
            state.destroyed = true;
            state.active = false;
            state.asset_count = 0;
            state.assets_loaded = 0;
            std::mem::take(&mut state.bindings)
        };
        drop(bindings);
        self.tracker.loaded.clear();
        log::info!("Scene {} destroyed", self.label());
    }

    /// Bind every asset entity in `entity`'s subtree.
    pub(crate) fn bind(&self, entity: &Entity) {
        if self.is_destroyed() {
            return;
        }
        entity.walk(&mut |node| {
            if let Entity::Asset(asset) = node {
                self.bind_asset(asset);
            }
        });
    }

    /// Unbind every asset entity in `entity`'s subtree. The caller re-checks readiness.
    pub(crate) fn unbind(&self, entity: &Entity) {
        entity.walk(&mut |node| {
            if let Entity::Asset(asset) = node {
                self.unbind_asset(asset);
            }
        });
    }

    fn bind_asset(&self, asset: &AssetEntity) {
        let id = asset.id();
        if self.tracker.state.borrow().bindings.contains_key(&id) {
            log::debug!("Asset entity {} already bound to scene {}", id, self.label());
            return;
        }

        asset.reattach();
        let loaded = asset.loaded();
        let subscription = (!loaded).then(|| {
            let weak = Rc::downgrade(&self.group.inner);
            asset.on_loaded(move |entity| {
                if let Some(scene) = Scene::from_weak(&weak) {
                    scene.entity_loaded(entity);
                }
            })
        });

        let mut state = self.tracker.state.borrow_mut();
        state.asset_count += 1;
        if loaded {
            state.assets_loaded += 1;
        }
        state.bindings.insert(
            id,
            Binding {
                loaded,
                subscription,
            },
        );
    }

    fn unbind_asset(&self, asset: &AssetEntity) {
        let binding = {
            let mut state = self.tracker.state.borrow_mut();
            let Some(binding) = state.bindings.remove(&asset.id()) else {
                return;
            };
            state.asset_count -= 1;
            if binding.loaded {
                state.assets_loaded -= 1;
            }
            binding
        };
        drop(binding);
    }

    fn entity_loaded(&self, entity: &AssetEntity) {
        let subscription = {
            let mut state = self.tracker.state.borrow_mut();
            let Some(binding) = state.bindings.get_mut(&entity.id()) else {
                return;
            };
            if binding.loaded {
                return;
            }
            binding.loaded = true;
            let subscription = binding.subscription.take();
            state.assets_loaded += 1;
            subscription
        };
        drop(subscription);
        log::debug!(
            "Scene {}: {}/{} assets loaded",
            self.label(),
            self.assets_loaded(),
            self.asset_count()
        );
        self.evaluate();
    }

    pub(crate) fn evaluate(&self) {
        let count = {
            let mut state = self.tracker.state.borrow_mut();
            if state.loaded
                || !state.configured
                || state.destroyed
                || state.assets_loaded != state.asset_count
            {
                return;
            }
            state.loaded = true;
            state.asset_count
        };
        log::info!("Scene {} loaded ({} assets)", self.label(), count);
        self.to_entity().call(HookKind::Load);
        self.tracker.loaded.emit(self);
    }

    fn label(&self) -> String {
        match self.name() {
            Some(name) => format!("'{name}'"),
            None => self.id().to_string(),
        }
    }
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.tracker.state.borrow();
        f.debug_struct("Scene")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("asset_count", &state.asset_count)
            .field("assets_loaded", &state.assets_loaded)
            .field("loaded", &state.loaded)
            .field("active", &state.active)
            .finish()
    }
}
