//! Entity tree and scene readiness.
//!
//! A [`Scene`] counts every [`AssetEntity`] below it and fires its `loaded` event once all of
//! them have resolved. Structural changes anywhere under a scene keep the count current.

pub mod asset_entity;
pub mod engine;
pub mod entity;
pub mod game;
pub mod group;
pub mod hooks;
pub mod scene;

pub use asset_entity::AssetEntity;
pub use engine::Engine;
pub use entity::{Entity, EntityId, EntityOptions, Leaf};
pub use game::Game;
pub use group::Group;
pub use hooks::{HookKind, Hooks, UpdatePhase};
pub use scene::Scene;
