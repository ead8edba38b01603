//! Window stack standing in for the platform's navigation container

use tracing::debug;

use crate::host::Navigator;
use crate::windows::WindowKind;

/// Ordered stack of open windows. Removed windows are reported back through
/// `take_popped` so the loop can close their controllers.
#[derive(Debug, Default)]
pub struct WindowStack {
    windows: Vec<WindowKind>,
    popped: Vec<WindowKind>,
}

impl WindowStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> Option<WindowKind> {
        self.windows.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Windows removed since the last call
    pub fn take_popped(&mut self) -> Vec<WindowKind> {
        std::mem::take(&mut self.popped)
    }
}

impl Navigator for WindowStack {
    fn push(&mut self, window: WindowKind) {
        debug!("Push {:?}", window);
        self.windows.push(window);
    }

    fn pop(&mut self, window: WindowKind) {
        if let Some(pos) = self.windows.iter().rposition(|w| *w == window) {
            debug!("Pop {:?}", window);
            self.windows.remove(pos);
            self.popped.push(window);
        }
    }

    fn pop_all(&mut self) {
        debug!("Pop all ({} windows)", self.windows.len());
        while let Some(window) = self.windows.pop() {
            self.popped.push(window);
        }
    }

    fn is_topmost(&self, window: WindowKind) -> bool {
        self.top() == Some(window)
    }
}
