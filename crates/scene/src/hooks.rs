//! Lifecycle hooks bound from entity options.

use std::{fmt, rc::Rc};

use crate::entity::Entity;

pub type Hook = Rc<dyn Fn(&Entity)>;
pub type UpdateHook = Rc<dyn Fn(&Entity, f32)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookKind {
    /// Asset resolved (asset entities) or every asset resolved (scenes).
    Load,
    Start,
    Destroy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdatePhase {
    Pre,
    Main,
    Post,
}

#[derive(Clone, Default)]
pub struct Hooks {
    load: Option<Hook>,
    start: Option<Hook>,
    destroy: Option<Hook>,
    preupdate: Option<UpdateHook>,
    update: Option<UpdateHook>,
    postupdate: Option<UpdateHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load(mut self, hook: impl Fn(&Entity) + 'static) -> Self {
        self.load = Some(Rc::new(hook));
        self
    }

    pub fn on_start(mut self, hook: impl Fn(&Entity) + 'static) -> Self {
        self.start = Some(Rc::new(hook));
        self
    }

    pub fn on_destroy(mut self, hook: impl Fn(&Entity) + 'static) -> Self {
        self.destroy = Some(Rc::new(hook));
        self
    }

    pub fn on_preupdate(mut self, hook: impl Fn(&Entity, f32) + 'static) -> Self {
        self.preupdate = Some(Rc::new(hook));
        self
    }

    pub fn on_update(mut self, hook: impl Fn(&Entity, f32) + 'static) -> Self {
        self.update = Some(Rc::new(hook));
        self
    }

    pub fn on_postupdate(mut self, hook: impl Fn(&Entity, f32) + 'static) -> Self {
        self.postupdate = Some(Rc::new(hook));
        self
    }

    pub(crate) fn get(&self, kind: HookKind) -> Option<Hook> {
        match kind {
            HookKind::Load => self.load.clone(),
            HookKind::Start => self.start.clone(),
            HookKind::Destroy => self.destroy.clone(),
        }
    }

    pub(crate) fn get_update(&self, phase: UpdatePhase) -> Option<UpdateHook> {
        match phase {
            UpdatePhase::Pre => self.preupdate.clone(),
            UpdatePhase::Main => self.update.clone(),
            UpdatePhase::Post => self.postupdate.clone(),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("load", &self.load.is_some())
            .field("start", &self.start.is_some())
            .field("destroy", &self.destroy.is_some())
            .field("preupdate", &self.preupdate.is_some())
            .field("update", &self.update.is_some())
            .field("postupdate", &self.postupdate.is_some())
            .finish()
    }
}
