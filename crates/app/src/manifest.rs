//! RON scene manifests: which assets exist and how each scene's tree is laid out.
//!
//! ```ron
//! #![enable(implicit_some)]
//! (
//!     assets: [(kind: Image, name: "hero", path: "hero.png")],
//!     scenes: [(
//!         config: (name: "level1"),
//!         children: [
//!             Asset(kind: Image, name: "hero", config: (x: 10.0)),
//!             Group(config: (name: "props"), children: [Entity(config: (tag: "spawn"))]),
//!         ],
//!     )],
//! )
//! ```

use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use asset::{AssetType, Loader};
use corelib::{CoreResult, EntityConfig};
use scene::{Entity, Game, Scene};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum AssetKind {
    Image,
    Audio,
    Text,
    Binary,
}

impl From<AssetKind> for AssetType {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Image => AssetType::Image,
            AssetKind::Audio => AssetType::Audio,
            AssetKind::Text => AssetType::Text,
            AssetKind::Binary => AssetType::Binary,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AssetDesc {
    pub kind: AssetKind,
    pub name: String,
    pub path: String,
}

#[derive(Clone, Debug, Deserialize)]
pub enum NodeDesc {
    Entity {
        #[serde(default)]
        config: EntityConfig,
    },
    Group {
        #[serde(default)]
        config: EntityConfig,
        #[serde(default)]
        children: Vec<NodeDesc>,
    },
    Asset {
        kind: AssetKind,
        name: String,
        #[serde(default)]
        config: EntityConfig,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct SceneDesc {
    pub config: EntityConfig,
    #[serde(default)]
    pub children: Vec<NodeDesc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub assets: Vec<AssetDesc>,
    #[serde(default)]
    pub scenes: Vec<SceneDesc>,
}

impl FromStr for Manifest {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        ron::from_str(text).context("Failed to parse RON manifest")
    }
}

impl Manifest {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        text.parse::<Self>()
            .with_context(|| format!("Invalid manifest {}", path.display()))
    }

    /// Register every listed asset with `loader`.
    pub fn register(&self, loader: &Loader) {
        for desc in &self.assets {
            loader.add(desc.kind.into(), &desc.name, desc.path.clone());
        }
        log::info!("Registered {} assets from manifest", self.assets.len());
    }

    /// Build every scene into `game`, in manifest order.
    pub fn build(&self, game: &mut Game) -> Result<Vec<Scene>> {
        let mut scenes = Vec::with_capacity(self.scenes.len());
        for desc in &self.scenes {
            let label = desc.config.name.clone().unwrap_or_default();
            let scene = game
                .scene(desc.config.clone(), |game, scene| {
                    for child in &desc.children {
                        scene.add(build_node(game, child)?);
                    }
                    Ok(())
                })
                .with_context(|| format!("Failed to build scene '{label}'"))?;
            scenes.push(scene);
        }
        Ok(scenes)
    }
}

fn build_node(game: &Game, desc: &NodeDesc) -> CoreResult<Entity> {
    match desc {
        NodeDesc::Entity { config } => game.entity(config.clone()).map(Entity::from),
        NodeDesc::Group { config, children } => {
            let group = game.group(config.clone())?;
            for child in children {
                group.add(build_node(game, child)?);
            }
            Ok(group.into())
        }
        NodeDesc::Asset { kind, name, config } => game
            .asset_entity((*kind).into(), name, config.clone())
            .map(Entity::from),
    }
}
