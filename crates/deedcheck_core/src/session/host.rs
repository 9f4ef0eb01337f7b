//! What the session needs from the page hosting it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::progress::{Navigation, ProgressSnapshot, BASE_TITLE};

/// The page showing an analysis: a router, a title bar and a view.
///
/// Calls happen on the session's task, one at a time, in the order the
/// controller produced them. `render` follows every state change.
pub trait SessionHost: Send {
    /// Leave the progress page.
    fn navigate_to(&mut self, navigation: &Navigation);

    /// Title changed. The shared [`PageTitle`] is already updated.
    fn set_title(&mut self, title: &str);

    /// Draw the current progress.
    fn render(&mut self, snapshot: &ProgressSnapshot);
}

/// Shared page title, injected instead of a global.
///
/// Cloning gives another view of the same title.
#[derive(Debug, Clone)]
pub struct PageTitle {
    inner: Arc<Mutex<String>>,
}

impl PageTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(title.into())),
        }
    }

    pub fn set(&self, title: &str) {
        let mut current = self.inner.lock();
        current.clear();
        current.push_str(title);
    }

    pub fn get(&self) -> String {
        self.inner.lock().clone()
    }
}

impl Default for PageTitle {
    fn default() -> Self {
        Self::new(BASE_TITLE)
    }
}
