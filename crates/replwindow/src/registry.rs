//! Window registry owned by the host application.
//!
//! The registry is created once by the host and lives on the UI thread; it
//! owns every window it creates and hands out [`WindowId`]s for them.

use std::collections::BTreeMap;
use std::fmt;

use replwindow_core::{ReplEvaluator, ReplResult, ReplWindow, WindowHandle};

use crate::builder::ReplWindowBuilder;

/// Numeric id of a window. Ids of closed windows are reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notified for every window the registry creates, before the window starts.
pub trait WindowCreationListener {
    fn window_created(&self, id: WindowId, repl_id: &str, window: &mut ReplWindow);
}

struct RegisteredWindow {
    repl_id: String,
    window: ReplWindow,
}

/// Owns the REPL windows of a host.
#[derive(Default)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, RegisteredWindow>,
    listeners: Vec<Box<dyn WindowCreationListener>>,
}

impl fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowRegistry")
            .field("windows", &self.windows.keys().collect::<Vec<_>>())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn WindowCreationListener>) {
        self.listeners.push(listener);
    }

    /// Builds a window for `repl_id`, notifies the listeners and starts it.
    ///
    /// The window gets the lowest id not in use.
    pub fn create_window<E>(
        &mut self,
        repl_id: impl Into<String>,
        builder: ReplWindowBuilder,
        evaluator: E,
    ) -> ReplResult<WindowId>
    where
        E: ReplEvaluator + 'static,
    {
        let repl_id = repl_id.into();
        let mut window = builder.build(evaluator)?;
        let id = self.free_id();
        for listener in &self.listeners {
            listener.window_created(id, &repl_id, &mut window);
        }
        let started = window.start();
        if !started.success {
            log::warn!("evaluator for window {id} ('{repl_id}') failed to initialize");
        }
        log::debug!("created window {id} for '{repl_id}'");
        self.windows.insert(id, RegisteredWindow { repl_id, window });
        Ok(id)
    }

    fn free_id(&self) -> WindowId {
        let mut next = 0;
        for id in self.windows.keys() {
            if id.0 != next {
                break;
            }
            next += 1;
        }
        WindowId(next)
    }

    pub fn get(&self, id: WindowId) -> Option<&ReplWindow> {
        self.windows.get(&id).map(|entry| &entry.window)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut ReplWindow> {
        self.windows.get_mut(&id).map(|entry| &mut entry.window)
    }

    pub fn repl_id(&self, id: WindowId) -> Option<&str> {
        self.windows.get(&id).map(|entry| entry.repl_id.as_str())
    }

    /// The lowest-numbered window created for `repl_id`.
    pub fn find_by_repl_id(&self, repl_id: &str) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, entry)| entry.repl_id == repl_id)
            .map(|(id, _)| *id)
    }

    /// A handle for posting work to the window from other threads.
    pub fn handle(&self, id: WindowId) -> Option<WindowHandle> {
        self.get(id).map(ReplWindow::handle)
    }

    /// Removes the window. Handles to it fail with `WindowClosed` from then on.
    pub fn close(&mut self, id: WindowId) -> Option<ReplWindow> {
        let entry = self.windows.remove(&id)?;
        log::debug!("closed window {id} ('{}')", entry.repl_id);
        Some(entry.window)
    }

    pub fn ids(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.windows.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Runs the queued work of every window. Returns the number of tasks run.
    pub fn pump_all(&mut self) -> usize {
        self.windows
            .values_mut()
            .map(|entry| entry.window.pump())
            .sum()
    }
}
