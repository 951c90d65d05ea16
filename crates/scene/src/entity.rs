//! Entity identity, shared node state and the closed set of entity kinds.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
    sync::atomic::{AtomicU64, Ordering},
};

use corelib::{EntityConfig, Transform};

use crate::{
    asset_entity::AssetEntity,
    group::{Group, GroupInner},
    hooks::{HookKind, Hooks, UpdatePhase},
    scene::Scene,
};

/// Process-unique entity id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity options: placement/identity plus lifecycle hooks.
#[derive(Clone, Debug, Default)]
pub struct EntityOptions {
    pub config: EntityConfig,
    pub hooks: Hooks,
}

impl EntityOptions {
    pub fn new(config: EntityConfig, hooks: Hooks) -> Self {
        Self { config, hooks }
    }
}

impl From<EntityConfig> for EntityOptions {
    fn from(config: EntityConfig) -> Self {
        Self {
            config,
            hooks: Hooks::default(),
        }
    }
}

/// State every entity kind carries.
pub(crate) struct Node {
    pub(crate) id: EntityId,
    pub(crate) name: Option<String>,
    pub(crate) tag: Option<String>,
    pub(crate) transform: RefCell<Transform>,
    pub(crate) hooks: Hooks,
    /// Non-owning back-reference to the container holding this entity.
    pub(crate) parent: RefCell<Weak<GroupInner>>,
}

impl Node {
    pub(crate) fn new(options: EntityOptions) -> Self {
        let EntityOptions { config, hooks } = options;
        Self {
            id: EntityId::next(),
            transform: RefCell::new(config.transform()),
            name: config.name,
            tag: config.tag,
            hooks,
            parent: RefCell::new(Weak::new()),
        }
    }

    pub(crate) fn call(&self, kind: HookKind, entity: &Entity) {
        if let Some(hook) = self.hooks.get(kind) {
            hook(entity);
        }
    }

    pub(crate) fn call_update(&self, phase: UpdatePhase, entity: &Entity, dt: f32) {
        if let Some(hook) = self.hooks.get_update(phase) {
            hook(entity, dt);
        }
    }
}

/// Plain entity without children or asset.
#[derive(Clone)]
pub struct Leaf {
    pub(crate) node: Rc<Node>,
}

impl Leaf {
    pub fn new(options: impl Into<EntityOptions>) -> Self {
        Self {
            node: Rc::new(Node::new(options.into())),
        }
    }
}

/// Every kind of node the tree can hold.
#[derive(Clone)]
pub enum Entity {
    Leaf(Leaf),
    Group(Group),
    Scene(Scene),
    Asset(AssetEntity),
}

impl Entity {
    pub(crate) fn node(&self) -> &Node {
        match self {
            Entity::Leaf(leaf) => &leaf.node,
            Entity::Group(group) => &group.inner.node,
            Entity::Scene(scene) => &scene.group().inner.node,
            Entity::Asset(asset) => asset.node(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.node().id
    }

    pub fn name(&self) -> Option<&str> {
        self.node().name.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.node().tag.as_deref()
    }

    pub fn transform(&self) -> Transform {
        *self.node().transform.borrow()
    }

    pub fn set_transform(&self, transform: Transform) {
        *self.node().transform.borrow_mut() = transform;
    }

    /// Container currently holding this entity.
    pub fn parent(&self) -> Option<Group> {
        self.node()
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Group { inner })
    }

    /// Children view for groups and scenes.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Entity::Group(group) => Some(group),
            Entity::Scene(scene) => Some(scene.group()),
            Entity::Leaf(_) | Entity::Asset(_) => None,
        }
    }

    pub fn as_scene(&self) -> Option<&Scene> {
        match self {
            Entity::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn as_asset(&self) -> Option<&AssetEntity> {
        match self {
            Entity::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    /// Visit this entity and every descendant, pre-order in child order.
    ///
    /// Children are snapshotted per container, so the visitor may restructure the tree.
    pub fn walk(&self, visit: &mut dyn FnMut(&Entity)) {
        visit(self);
        if let Some(group) = self.as_group() {
            for child in group.children() {
                child.walk(visit);
            }
        }
    }

    pub(crate) fn call(&self, kind: HookKind) {
        self.node().call(kind, self);
    }

    pub(crate) fn call_update(&self, phase: UpdatePhase, dt: f32) {
        self.node().call_update(phase, self, dt);
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Entity::Leaf(_) => "Leaf",
            Entity::Group(_) => "Group",
            Entity::Scene(_) => "Scene",
            Entity::Asset(_) => "Asset",
        };
        f.debug_struct(kind)
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

impl From<Leaf> for Entity {
    fn from(leaf: Leaf) -> Self {
        Entity::Leaf(leaf)
    }
}

impl From<Group> for Entity {
    fn from(group: Group) -> Self {
        group.to_entity()
    }
}

impl From<Scene> for Entity {
    fn from(scene: Scene) -> Self {
        Entity::Scene(scene)
    }
}

impl From<AssetEntity> for Entity {
    fn from(asset: AssetEntity) -> Self {
        Entity::Asset(asset)
    }
}

impl From<&Leaf> for Entity {
    fn from(leaf: &Leaf) -> Self {
        Entity::Leaf(leaf.clone())
    }
}

impl From<&Group> for Entity {
    fn from(group: &Group) -> Self {
        group.to_entity()
    }
}

impl From<&Scene> for Entity {
    fn from(scene: &Scene) -> Self {
        Entity::Scene(scene.clone())
    }
}

impl From<&AssetEntity> for Entity {
    fn from(asset: &AssetEntity) -> Self {
        Entity::Asset(asset.clone())
    }
}
