//! Top-level owner: the engine, its scenes and the run loop turns.

use std::rc::Rc;

use asset::{AssetType, Loader};
use corelib::{CoreError, CoreResult};

use crate::{
    asset_entity::AssetEntity,
    engine::Engine,
    entity::{EntityOptions, Leaf},
    group::Group,
    hooks::{HookKind, UpdatePhase},
    scene::Scene,
};

#[derive(Debug)]
pub struct Game {
    engine: Rc<Engine>,
    scenes: Vec<Scene>,
}

impl Game {
    pub fn new(loader: Loader) -> Self {
        Self {
            engine: Engine::new(loader),
            scenes: Vec::new(),
        }
    }

    pub fn engine(&self) -> &Rc<Engine> {
        &self.engine
    }

    pub fn loader(&self) -> &Loader {
        self.engine.loader()
    }

    pub fn entity(&self, options: impl Into<EntityOptions>) -> CoreResult<Leaf> {
        let options = options.into();
        options.config.validate()?;
        Ok(Leaf::new(options))
    }

    pub fn group(&self, options: impl Into<EntityOptions>) -> CoreResult<Group> {
        let options = options.into();
        options.config.validate()?;
        Ok(Group::new(options))
    }

    pub fn asset_entity(
        &self,
        asset_type: AssetType,
        name: &str,
        options: impl Into<EntityOptions>,
    ) -> CoreResult<AssetEntity> {
        let options = options.into();
        options.config.validate()?;
        Ok(AssetEntity::new(&self.engine, asset_type, name, options))
    }

    /// Build a scene in two phases: `build` adds the initial children, then the scene is
    /// marked configured and readiness is checked once.
    pub fn scene(
        &mut self,
        options: impl Into<EntityOptions>,
        build: impl FnOnce(&Self, &Scene) -> CoreResult<()>,
    ) -> CoreResult<Scene> {
        let options = options.into();
        options.config.validate()?;
        if options.config.name.as_deref().is_none_or(str::is_empty) {
            return Err(CoreError::InvalidConfig {
                field: "name",
                reason: "a scene needs a name".to_owned(),
            });
        }

        let scene = Scene::new(options);
        build(self, &scene)?;
        scene.configured();
        log::info!(
            "Scene '{}' ready to run: {}/{} assets loaded",
            scene.name().unwrap_or_default(),
            scene.assets_loaded(),
            scene.asset_count()
        );
        self.scenes.push(scene.clone());
        Ok(scene)
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn find_scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.name() == Some(name))
    }

    /// Start the run loop: queue registered assets and run start hooks.
    pub fn start(&self) {
        self.engine.start();
        for scene in &self.scenes {
            scene.to_entity().walk(&mut |entity| entity.call(HookKind::Start));
        }
    }

    /// One loop turn: finish queued loads, then run update hooks on active scenes.
    ///
    /// Returns how many assets finished loading this turn.
    pub fn update(&self, dt: f32) -> usize {
        let finished = self.loader().poll();
        for scene in self.scenes.iter().filter(|scene| scene.active()) {
            let root = scene.to_entity();
            for phase in [UpdatePhase::Pre, UpdatePhase::Main, UpdatePhase::Post] {
                root.walk(&mut |entity| entity.call_update(phase, dt));
            }
        }
        finished
    }

    pub fn remove_scene(&mut self, scene: &Scene) -> bool {
        let Some(index) = self.scenes.iter().position(|s| s == scene) else {
            return false;
        };
        self.scenes.remove(index).destroy();
        true
    }

    pub fn destroy(&mut self) {
        for scene in self.scenes.drain(..) {
            scene.destroy();
        }
        log::info!("Game destroyed");
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Loader::new())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use asset::{LoadState, LoaderEvent, MemorySource};
    use corelib::EntityConfig;

    use super::*;
    use crate::hooks::Hooks;

    #[test]
    fn empty_scene_is_loaded_after_construction() {
        let mut game = Game::default();
        let scene = game
            .scene(EntityConfig::named("menu"), |game, scene| {
                scene.add(game.entity(EntityConfig::named("title"))?);
                Ok(())
            })
            .expect("scene");
        assert!(scene.loaded());
        assert_eq!(game.find_scene("menu"), Some(&scene));
    }

    #[test]
    fn scene_requires_name() {
        let mut game = Game::default();
        let err = game.scene(EntityConfig::default(), |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { field: "name", .. }));
        assert!(game.scenes().is_empty());
    }

    #[test]
    fn invalid_child_config_aborts_build() {
        let mut game = Game::default();
        let result = game.scene(EntityConfig::named("broken"), |game, scene| {
            scene.add(game.entity(EntityConfig {
                alpha: -1.0,
                ..EntityConfig::default()
            })?);
            Ok(())
        });
        assert!(result.is_err());
        assert!(game.scenes().is_empty());
    }

    #[test]
    fn start_and_update_load_scene_assets() {
        let source = MemorySource::new()
            .with("hero.bin", vec![1, 2, 3])
            .with("music.ogg", vec![4]);
        let mut game = Game::new(Loader::with_source(source));
        game.loader().add(AssetType::Binary, "hero", "hero.bin");
        game.loader().add(AssetType::Audio, "music", "music.ogg");

        let scene = game
            .scene(EntityConfig::named("level1"), |game, scene| {
                let group = game.group(EntityConfig::named("actors"))?;
                group.add(game.asset_entity(AssetType::Binary, "hero", EntityConfig::default())?);
                scene.add(group);
                scene.add(game.asset_entity(AssetType::Audio, "music", EntityConfig::default())?);
                Ok(())
            })
            .expect("scene");
        assert_eq!(scene.asset_count(), 2);
        assert!(!scene.loaded());

        assert_eq!(game.update(0.016), 0);
        game.start();
        assert_eq!(game.loader().pending(), 2);
        assert_eq!(game.update(0.016), 2);
        assert!(scene.loaded());
    }

    #[test]
    fn update_runs_phases_in_order_on_active_scenes() {
        let mut game = Game::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let hooks = {
            let (pre, main, post) = (log.clone(), log.clone(), log.clone());
            Hooks::new()
                .on_preupdate(move |_, _| pre.borrow_mut().push("pre"))
                .on_update(move |_, _| main.borrow_mut().push("update"))
                .on_postupdate(move |_, _| post.borrow_mut().push("post"))
        };
        let scene = game
            .scene(EntityConfig::named("level"), |game, scene| {
                scene.add(game.entity(EntityOptions::new(EntityConfig::default(), hooks))?);
                Ok(())
            })
            .expect("scene");

        game.update(0.1);
        assert!(log.borrow().is_empty());

        scene.set_active(true);
        game.update(0.1);
        assert_eq!(*log.borrow(), ["pre", "update", "post"]);
    }

    #[test]
    fn start_runs_start_hooks_once_per_entity() {
        let mut game = Game::default();
        let started = Rc::new(Cell::new(0));
        let hooks = {
            let started = started.clone();
            Hooks::new().on_start(move |_| started.set(started.get() + 1))
        };
        game.scene(
            EntityOptions::new(EntityConfig::named("level"), hooks.clone()),
            |game, scene| {
                scene.add(game.entity(EntityOptions::new(EntityConfig::default(), hooks))?);
                Ok(())
            },
        )
        .expect("scene");
        game.start();
        assert_eq!(started.get(), 2);
        assert!(game.engine().started());
    }

    #[test]
    fn remove_scene_destroys_it() {
        let mut game = Game::default();
        let asset = game.loader().add(AssetType::Image, "tex", "tex.png");
        let scene = game
            .scene(EntityConfig::named("level"), |game, scene| {
                scene.add(game.asset_entity(AssetType::Image, "tex", EntityConfig::default())?);
                Ok(())
            })
            .expect("scene");
        assert!(game.remove_scene(&scene));
        assert!(!game.remove_scene(&scene));
        assert!(scene.is_destroyed());
        assert_eq!(asset.state(), LoadState::Unresolved);
        assert_eq!(game.loader().listeners(LoaderEvent::Load), 0);
    }
}
