use std::fmt;
use std::time::Instant;

use super::controller::{NavMode, NavigationController};

/// Identifier of a screen or modal overlay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OverlayId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OverlayId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

struct OverlayEntry<H> {
    id: OverlayId,
    controller: NavigationController<H>,
}

struct DismissTimer {
    overlay: OverlayId,
    deadline: Instant,
}

/// LIFO stack of active screens/modals, each with its own
/// [`NavigationController`].
///
/// Only the topmost controller receives key events. Pushing suspends
/// the previous top; popping resumes it with its focus position
/// untouched. The base screen is permanent: `Back` can never pop it.
pub struct OverlayStack<H> {
    stack: Vec<OverlayEntry<H>>,
    dismiss_timers: Vec<DismissTimer>,
}

impl<H: Clone> OverlayStack<H> {
    pub fn new(base: impl Into<OverlayId>, mode: NavMode) -> Self {
        let id = base.into();
        let controller = NavigationController::new(id.clone(), mode);
        Self {
            stack: vec![OverlayEntry { id, controller }],
            dismiss_timers: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn active_id(&self) -> &OverlayId {
        &self.stack.last().expect("stack is never empty").id
    }

    pub fn active_controller(&mut self) -> &mut NavigationController<H> {
        &mut self.stack.last_mut().expect("stack is never empty").controller
    }

    pub fn active(&self) -> &NavigationController<H> {
        &self.stack.last().expect("stack is never empty").controller
    }

    /// Push a fresh overlay and activate its controller. Pushing the
    /// overlay that is already topmost is a no-op (repeated activation
    /// events must not stack duplicates).
    pub fn push(&mut self, id: impl Into<OverlayId>, mode: NavMode) -> &mut NavigationController<H> {
        let id = id.into();
        if *self.active_id() == id {
            log::debug!("overlay {id} already topmost, push ignored");
            return self.active_controller();
        }
        log::debug!("overlay pushed: {id} (depth {})", self.stack.len() + 1);
        let controller = NavigationController::new(id.clone(), mode);
        self.stack.push(OverlayEntry { id, controller });
        self.active_controller()
    }

    /// Pop the topmost overlay. A no-op returning `None` when only the
    /// base screen remains.
    pub fn pop(&mut self) -> Option<OverlayId> {
        if self.stack.len() <= 1 {
            return None;
        }
        let entry = self.stack.pop().expect("depth checked above");
        // Pending auto-dismiss timers for this overlay die with it.
        self.dismiss_timers.retain(|t| t.overlay != entry.id);
        log::debug!("overlay popped: {} (depth {})", entry.id, self.stack.len());
        Some(entry.id)
    }

    /// Back always addresses the top of the stack; a screen cannot
    /// intercept it while anything is stacked above. Returns whether a
    /// pop occurred.
    pub fn handle_back(&mut self) -> bool {
        self.pop().is_some()
    }

    /// Controller for a scope anywhere in the stack. Registration may
    /// target suspended overlays (their items keep re-rendering
    /// underneath a modal).
    pub fn controller_for(&mut self, scope: &OverlayId) -> Option<&mut NavigationController<H>> {
        self.stack
            .iter_mut()
            .find(|e| e.id == *scope)
            .map(|e| &mut e.controller)
    }

    pub fn contains(&self, scope: &OverlayId) -> bool {
        self.stack.iter().any(|e| e.id == *scope)
    }

    /// Schedule an auto-dismiss for an overlay. The timer only acts if
    /// the overlay is still topmost when it fires; popping the overlay
    /// early cancels it.
    pub fn schedule_dismiss(&mut self, overlay: impl Into<OverlayId>, deadline: Instant) {
        let overlay = overlay.into();
        if !self.contains(&overlay) {
            log::warn!("dismiss scheduled for unknown overlay {overlay}");
            return;
        }
        self.dismiss_timers.push(DismissTimer { overlay, deadline });
    }

    /// Fire due auto-dismiss timers, returning the overlays that were
    /// actually popped. A due timer whose overlay is no longer topmost
    /// does nothing and is discarded.
    pub fn poll_timers(&mut self, now: Instant) -> Vec<OverlayId> {
        let mut due = Vec::new();
        self.dismiss_timers.retain(|t| {
            if t.deadline <= now {
                due.push(t.overlay.clone());
                false
            } else {
                true
            }
        });

        let mut dismissed = Vec::new();
        for overlay in due {
            if *self.active_id() == overlay {
                if self.pop().is_some() {
                    dismissed.push(overlay);
                }
            } else {
                log::debug!("dismiss timer for {overlay} fired while not topmost, ignored");
            }
        }
        dismissed
    }
}
