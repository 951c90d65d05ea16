//! Ordered container of child entities.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    entity::{Entity, EntityId, EntityOptions, Node},
    scene::{LoadTracker, Scene},
};

pub(crate) struct GroupInner {
    pub(crate) node: Node,
    pub(crate) children: RefCell<Vec<Entity>>,
    /// Present when this container is a scene.
    pub(crate) tracker: Option<Rc<LoadTracker>>,
}

/// Container owning an ordered list of children. An entity lives in at most one container.
#[derive(Clone)]
pub struct Group {
    pub(crate) inner: Rc<GroupInner>,
}

impl Group {
    pub fn new(options: impl Into<EntityOptions>) -> Self {
        Self::build(options.into(), None)
    }

    pub(crate) fn build(options: EntityOptions, tracker: Option<Rc<LoadTracker>>) -> Self {
        Self {
            inner: Rc::new(GroupInner {
                node: Node::new(options),
                children: RefCell::new(Vec::new()),
                tracker,
            }),
        }
    }

    pub fn id(&self) -> EntityId {
        self.inner.node.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.node.name.as_deref()
    }

    /// Snapshot of the children, in insertion order.
    pub fn children(&self) -> Vec<Entity> {
        self.inner.children.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if `entity` is a direct child of this container.
    pub fn contains(&self, entity: &Entity) -> bool {
        entity
            .node()
            .parent
            .borrow()
            .upgrade()
            .is_some_and(|parent| Rc::ptr_eq(&parent, &self.inner))
    }

    pub fn parent(&self) -> Option<Group> {
        self.inner
            .node
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Group { inner })
    }

    /// Scene view of this container, if it is one.
    pub fn as_scene(&self) -> Option<Scene> {
        Scene::from_group(self)
    }

    pub fn to_entity(&self) -> Entity {
        match self.as_scene() {
            Some(scene) => Entity::Scene(scene),
            None => Entity::Group(self.clone()),
        }
    }

    /// Append `entity`, moving it out of its previous container.
    ///
    /// Fails when the entity is already a child here, or when adding it would make a
    /// container its own descendant.
    pub fn add(&self, entity: impl Into<Entity>) -> bool {
        let entity = entity.into();
        if self.contains(&entity) {
            log::debug!("{:?} is already a child of {}", entity, self.id());
            return false;
        }
        if entity.as_group().is_some_and(|group| self.is_within(group)) {
            log::warn!("Refusing to add {:?} inside itself", entity);
            return false;
        }

        // Readiness is re-checked only after the entity is bound in its new place.
        let mut touched = entity
            .parent()
            .and_then(|previous| previous.detach(&entity))
            .unwrap_or_default();

        let scenes = self.scenes();
        for scene in &scenes {
            scene.bind(&entity);
        }
        *entity.node().parent.borrow_mut() = Rc::downgrade(&self.inner);
        self.inner.children.borrow_mut().push(entity);

        touched.extend(scenes);
        for scene in touched {
            scene.evaluate();
        }
        true
    }

    /// Detach `entity`. Returns whether it was a child here.
    pub fn remove(&self, entity: &Entity) -> bool {
        let Some(scenes) = self.detach(entity) else {
            return false;
        };
        for scene in scenes {
            scene.evaluate();
        }
        true
    }

    /// Unlink `entity` and unbind it from every enclosing scene without re-checking
    /// readiness. Returns the scenes that were touched.
    fn detach(&self, entity: &Entity) -> Option<Vec<Scene>> {
        let index = self
            .inner
            .children
            .borrow()
            .iter()
            .position(|child| child == entity)?;

        let removed = self.inner.children.borrow_mut().remove(index);
        *removed.node().parent.borrow_mut() = Weak::new();
        let scenes = self.scenes();
        for scene in &scenes {
            scene.unbind(&removed);
        }
        Some(scenes)
    }

    /// `true` if `other` is this container or one of its ancestors.
    fn is_within(&self, other: &Group) -> bool {
        let mut current = Some(self.clone());
        while let Some(group) = current {
            if Rc::ptr_eq(&group.inner, &other.inner) {
                return true;
            }
            current = group.parent();
        }
        false
    }

    /// Scenes whose subtree includes this container, nearest first.
    fn scenes(&self) -> Vec<Scene> {
        let mut scenes = Vec::new();
        let mut current = Some(self.clone());
        while let Some(group) = current {
            if let Some(scene) = group.as_scene() {
                scenes.push(scene);
            }
            current = group.parent();
        }
        scenes
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("children", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use corelib::EntityConfig;

    use super::*;
    use crate::entity::Leaf;

    fn leaf(name: &str) -> Entity {
        Leaf::new(EntityConfig::named(name)).into()
    }

    #[test]
    fn add_keeps_order_and_sets_parent() {
        let group = Group::new(EntityConfig::named("g"));
        let a = leaf("a");
        let b = leaf("b");
        assert!(group.add(a.clone()));
        assert!(group.add(b.clone()));
        assert_eq!(group.children(), vec![a.clone(), b]);
        assert_eq!(a.parent(), Some(group));
    }

    #[test]
    fn adding_twice_fails() {
        let group = Group::new(EntityConfig::default());
        let a = leaf("a");
        assert!(group.add(a.clone()));
        assert!(!group.add(a));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn add_moves_membership() {
        let first = Group::new(EntityConfig::default());
        let second = Group::new(EntityConfig::default());
        let a = leaf("a");
        first.add(a.clone());
        assert!(second.add(a.clone()));
        assert!(first.is_empty());
        assert!(second.contains(&a));
    }

    #[test]
    fn remove_reports_membership() {
        let group = Group::new(EntityConfig::default());
        let a = leaf("a");
        assert!(!group.remove(&a));
        group.add(a.clone());
        assert!(group.remove(&a));
        assert!(a.parent().is_none());
        assert!(group.is_empty());
    }

    #[test]
    fn rejects_cycles() {
        let outer = Group::new(EntityConfig::default());
        let inner = Group::new(EntityConfig::default());
        outer.add(&inner);
        assert!(!inner.add(&outer));
        assert!(!outer.add(&outer));
        assert!(outer.parent().is_none());
    }
}
