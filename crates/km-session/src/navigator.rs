use std::sync::{Mutex, PoisonError};

use log::info;
use url::Url;

/// The host's address bar.
///
/// A redirect hands control to another page; the caller must not assume
/// anything runs after it. `replace_url` rewrites the current address
/// without navigating (history replace).
pub trait Navigator: Send + Sync {
    fn current_url(&self) -> Url;

    fn redirect(&self, url: &Url);

    fn replace_url(&self, url: &Url);
}

/// Navigator that records redirects instead of performing them.
///
/// Used by hosts without a browser (the CLI prints the pending redirect).
#[derive(Debug)]
pub struct MemoryNavigator {
    current: Mutex<Url>,
    redirects: Mutex<Vec<Url>>,
}

impl MemoryNavigator {
    pub fn new(current: Url) -> Self {
        Self {
            current: Mutex::new(current),
            redirects: Mutex::new(Vec::new()),
        }
    }

    /// Simulate the user landing on `url` (e.g. returning from the identity provider)
    pub fn set_current(&self, url: Url) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = url;
    }

    pub fn redirects(&self) -> Vec<Url> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_redirect(&self) -> Option<Url> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for MemoryNavigator {
    fn current_url(&self) -> Url {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn redirect(&self, url: &Url) {
        info!("Redirecting to {}", url.origin().ascii_serialization());
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
    }

    fn replace_url(&self, url: &Url) {
        self.set_current(url.clone());
    }
}
