//! Modals and drawers.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OverlayError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Modal,
    Drawer,
}

#[derive(Debug)]
struct OverlayState {
    open: AtomicBool,
    mounted: AtomicBool,
}

/// Closes the overlay it came from. Cloneable and safe to call repeatedly.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    state: Arc<OverlayState>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.state.open.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.state.open.load(Ordering::Acquire)
    }
}

/// A transient surface with owned open state.
///
/// Closing never cancels work started from the overlay; results of such work
/// are discarded by [`Overlay::run`] once the overlay is unmounted.
#[derive(Debug)]
pub struct Overlay {
    kind: OverlayKind,
    title: String,
    trigger_label: String,
    state: Arc<OverlayState>,
}

impl Overlay {
    pub fn new(kind: OverlayKind, title: impl Into<String>, trigger_label: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            trigger_label: trigger_label.into(),
            state: Arc::new(OverlayState {
                open: AtomicBool::new(false),
                mounted: AtomicBool::new(true),
            }),
        }
    }

    pub fn modal(title: impl Into<String>, trigger_label: impl Into<String>) -> Self {
        Self::new(OverlayKind::Modal, title, trigger_label)
    }

    pub fn drawer(title: impl Into<String>, trigger_label: impl Into<String>) -> Self {
        Self::new(OverlayKind::Drawer, title, trigger_label)
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn trigger_label(&self) -> &str {
        &self.trigger_label
    }

    /// Open from the trigger. Has no effect once unmounted.
    pub fn open(&self) {
        if self.is_mounted() {
            self.state.open.store(true, Ordering::Release);
        }
    }

    pub fn close(&self) {
        self.close_handle().close();
    }

    pub fn is_open(&self) -> bool {
        self.state.open.load(Ordering::Acquire)
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Build the content. Only available while open.
    pub fn content<T>(&self, build: impl FnOnce(CloseHandle) -> T) -> Result<T> {
        if !self.is_open() {
            return Err(OverlayError::not_open(&self.title));
        }
        Ok(build(self.close_handle()))
    }

    /// Tear the overlay down; it closes and stays closed.
    pub fn unmount(&self) {
        self.state.mounted.store(false, Ordering::Release);
        self.close();
    }

    pub fn is_mounted(&self) -> bool {
        self.state.mounted.load(Ordering::Acquire)
    }

    /// Await work started from this overlay, dropping the result if the
    /// overlay was unmounted meanwhile.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        let output = work.await;
        if self.is_mounted() {
            Some(output)
        } else {
            debug!(title = %self.title, "overlay unmounted, discarding result");
            None
        }
    }
}
