//! Shared runtime context handed to entities that need the loader.

use std::{cell::Cell, fmt, rc::Rc};

use asset::Loader;

pub struct Engine {
    loader: Loader,
    started: Cell<bool>,
}

impl Engine {
    pub fn new(loader: Loader) -> Rc<Self> {
        Rc::new(Self {
            loader,
            started: Cell::new(false),
        })
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Whether the run loop is going. Assets bound after this point load eagerly.
    pub fn started(&self) -> bool {
        self.started.get()
    }

    /// Enter the running state and queue every asset registered so far.
    pub fn start(&self) {
        if self.started.replace(true) {
            return;
        }
        log::info!("Engine started");
        self.loader.load_all();
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("loader", &self.loader)
            .field("started", &self.started())
            .finish()
    }
}
