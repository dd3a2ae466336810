use std::time::{Duration, Instant};

use super::controller::NavMode;
use super::key::RemoteKey;
use super::overlay::{OverlayId, OverlayStack};

pub const DEFAULT_DIGIT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Most digits a channel number can accumulate before extra digits are
/// dropped.
const MAX_DIGITS: usize = 4;

/// What one dispatched key event did, as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterEvent<H> {
    /// Unknown raw key, suppressed directional, or a no-op transition.
    Ignored,
    /// Focus moved; scroll the handle into view.
    Moved { position: u32, scroll_to: H },
    /// Enter on a focused item; the host decides what activation means.
    Activated { overlay: OverlayId, position: u32 },
    /// Back popped an overlay.
    BackPopped(OverlayId),
    /// Back at the base screen; nothing to pop.
    BackIgnored,
    /// A digit was appended to the channel-number buffer.
    DigitEntry { value: u32 },
    /// Enter committed the channel-number buffer.
    ChannelSelect(u32),
    /// Back cancelled the channel-number buffer.
    DigitCancelled,
    /// The channel-number buffer timed out.
    DigitExpired,
    /// An auto-dismiss timer popped an overlay.
    OverlayDismissed(OverlayId),
}

/// Channel-number quick-select buffer.
///
/// Lives outside the navigation state machine but is mutually
/// exclusive with it: while digits are pending, directional keys are
/// suppressed. The buffer resets on its own timeout.
struct DigitBuffer {
    digits: String,
    deadline: Option<Instant>,
    timeout: Duration,
}

impl DigitBuffer {
    fn new(timeout: Duration) -> Self {
        Self {
            digits: String::new(),
            deadline: None,
            timeout,
        }
    }

    fn is_open(&self) -> bool {
        !self.digits.is_empty()
    }

    fn push(&mut self, digit: u8, now: Instant) -> u32 {
        if self.digits.len() < MAX_DIGITS {
            self.digits.push((b'0' + digit) as char);
        }
        self.deadline = Some(now + self.timeout);
        self.value()
    }

    fn value(&self) -> u32 {
        self.digits.parse().unwrap_or(0)
    }

    fn take(&mut self) -> u32 {
        let value = self.value();
        self.reset();
        value
    }

    fn reset(&mut self) {
        self.digits.clear();
        self.deadline = None;
    }

    fn expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(d) if d <= now)
    }
}

/// Top-level key-event dispatcher.
///
/// Normalizes raw keys, owns the digit buffer, and forwards everything
/// else to the overlay stack's active controller.
pub struct RemoteInputRouter<H> {
    overlays: OverlayStack<H>,
    digits: DigitBuffer,
}

impl<H: Clone> RemoteInputRouter<H> {
    pub fn new(base: impl Into<OverlayId>, mode: NavMode) -> Self {
        Self::with_digit_timeout(base, mode, DEFAULT_DIGIT_TIMEOUT)
    }

    pub fn with_digit_timeout(
        base: impl Into<OverlayId>,
        mode: NavMode,
        digit_timeout: Duration,
    ) -> Self {
        Self {
            overlays: OverlayStack::new(base, mode),
            digits: DigitBuffer::new(digit_timeout),
        }
    }

    pub fn overlays(&self) -> &OverlayStack<H> {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut OverlayStack<H> {
        &mut self.overlays
    }

    pub fn digit_buffer_open(&self) -> bool {
        self.digits.is_open()
    }

    /// Register a focusable item on behalf of the presentation layer.
    /// Returns false when the scope is not on the stack.
    pub fn register_focusable(&mut self, scope: &OverlayId, position: u32, handle: H) -> bool {
        match self.overlays.controller_for(scope) {
            Some(controller) => {
                controller.registry_mut().register(position, handle);
                true
            }
            None => {
                log::warn!("registration for unmounted overlay {scope} dropped");
                false
            }
        }
    }

    pub fn unregister_focusable(&mut self, scope: &OverlayId, position: u32) -> bool {
        match self.overlays.controller_for(scope) {
            Some(controller) => {
                controller.registry_mut().unregister(position);
                true
            }
            None => false,
        }
    }

    pub fn dispatch(&mut self, raw: &str) -> RouterEvent<H> {
        self.dispatch_at(raw, Instant::now())
    }

    pub fn dispatch_at(&mut self, raw: &str, now: Instant) -> RouterEvent<H> {
        let Some(key) = RemoteKey::from_raw(raw) else {
            log::debug!("unknown raw key {raw:?} dropped");
            return RouterEvent::Ignored;
        };

        // Digits never reach a NavigationController.
        if let RemoteKey::Digit(n) = key {
            let value = self.digits.push(n, now);
            return RouterEvent::DigitEntry { value };
        }

        if self.digits.is_open() {
            return match key {
                RemoteKey::Enter => RouterEvent::ChannelSelect(self.digits.take()),
                RemoteKey::Back => {
                    self.digits.reset();
                    RouterEvent::DigitCancelled
                }
                // Directional keys are suppressed while digits pend.
                _ => RouterEvent::Ignored,
            };
        }

        if key == RemoteKey::Back {
            return match self.overlays.pop() {
                Some(id) => RouterEvent::BackPopped(id),
                None => RouterEvent::BackIgnored,
            };
        }

        let outcome = self.overlays.active_controller().on_key(key);
        if outcome.activated {
            let position = self
                .overlays
                .active()
                .current_position()
                .expect("activation requires a focused position");
            return RouterEvent::Activated {
                overlay: self.overlays.active_id().clone(),
                position,
            };
        }
        match (outcome.scroll_to, self.overlays.active().current_position()) {
            (Some(scroll_to), Some(position)) => RouterEvent::Moved {
                position,
                scroll_to,
            },
            _ => RouterEvent::Ignored,
        }
    }

    pub fn poll_timers(&mut self) -> Vec<RouterEvent<H>> {
        self.poll_timers_at(Instant::now())
    }

    /// Drive the delayed callbacks: digit-buffer expiry and overlay
    /// auto-dismiss. Called by the host event loop.
    pub fn poll_timers_at(&mut self, now: Instant) -> Vec<RouterEvent<H>> {
        let mut events = Vec::new();
        if self.digits.expired(now) {
            self.digits.reset();
            events.push(RouterEvent::DigitExpired);
        }
        for overlay in self.overlays.poll_timers(now) {
            events.push(RouterEvent::OverlayDismissed(overlay));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> RemoteInputRouter<&'static str> {
        let mut router = RemoteInputRouter::new("home", NavMode::Grid { columns: 3 });
        let home = router.overlays_mut().active_controller();
        home.registry_mut().register(0, "live");
        home.registry_mut().register(1, "movies");
        home.registry_mut().register(2, "favorites");
        home.set_position(0);
        router
    }

    #[test]
    fn digits_accumulate_and_commit_on_enter() {
        let mut router = router();
        let t0 = Instant::now();
        assert_eq!(
            router.dispatch_at("1", t0),
            RouterEvent::DigitEntry { value: 1 }
        );
        assert_eq!(
            router.dispatch_at("0", t0),
            RouterEvent::DigitEntry { value: 10 }
        );
        assert_eq!(router.dispatch_at("Enter", t0), RouterEvent::ChannelSelect(10));
        assert!(!router.digit_buffer_open());
    }

    #[test]
    fn directional_keys_suppressed_while_digits_pend() {
        let mut router = router();
        let t0 = Instant::now();
        router.dispatch_at("5", t0);
        assert_eq!(router.dispatch_at("ArrowRight", t0), RouterEvent::Ignored);
        assert_eq!(
            router.overlays().active().current_position(),
            Some(0),
            "focus must not move while the buffer is open"
        );
    }

    #[test]
    fn back_cancels_digit_buffer_before_popping_overlays() {
        let mut router = router();
        let t0 = Instant::now();
        router.overlays_mut().push("epg", NavMode::Linear);
        router.dispatch_at("7", t0);
        assert_eq!(router.dispatch_at("Back", t0), RouterEvent::DigitCancelled);
        assert_eq!(router.overlays().depth(), 2, "overlay survives the cancel");
        assert_eq!(
            router.dispatch_at("Back", t0),
            RouterEvent::BackPopped(OverlayId::new("epg"))
        );
    }

    #[test]
    fn digit_buffer_expires_on_timeout() {
        let mut router = RemoteInputRouter::<&'static str>::with_digit_timeout(
            "home",
            NavMode::Linear,
            Duration::from_millis(100),
        );
        let t0 = Instant::now();
        router.dispatch_at("4", t0);
        assert!(router.poll_timers_at(t0 + Duration::from_millis(50)).is_empty());
        // Another digit pushes the deadline out.
        router.dispatch_at("2", t0 + Duration::from_millis(50));
        assert!(router.poll_timers_at(t0 + Duration::from_millis(120)).is_empty());
        let events = router.poll_timers_at(t0 + Duration::from_millis(150));
        assert_eq!(events, vec![RouterEvent::DigitExpired]);
        assert!(!router.digit_buffer_open());
    }

    #[test]
    fn digit_overflow_is_capped() {
        let mut router = router();
        let t0 = Instant::now();
        for raw in ["9", "9", "9", "9", "9", "9"] {
            router.dispatch_at(raw, t0);
        }
        assert_eq!(router.dispatch_at("Enter", t0), RouterEvent::ChannelSelect(9999));
    }

    #[test]
    fn back_at_base_is_reported_not_errored() {
        let mut router = router();
        assert_eq!(router.dispatch("Back"), RouterEvent::BackIgnored);
    }

    #[test]
    fn unknown_raw_keys_are_ignored() {
        let mut router = router();
        assert_eq!(router.dispatch("VolumeUp"), RouterEvent::Ignored);
    }

    #[test]
    fn enter_reports_activation_with_overlay_and_position() {
        let mut router = router();
        router.dispatch("ArrowRight");
        router.dispatch("ArrowRight");
        assert_eq!(
            router.dispatch("Enter"),
            RouterEvent::Activated {
                overlay: OverlayId::new("home"),
                position: 2,
            }
        );
    }

    #[test]
    fn registration_targets_suspended_overlays() {
        let mut router = router();
        router.overlays_mut().push("search", NavMode::Linear);
        let home = OverlayId::new("home");
        assert!(router.register_focusable(&home, 3, "series"));
        assert!(!router.register_focusable(&OverlayId::new("gone"), 0, "x"));
    }
}
