use super::focus::FocusRegistry;
use super::key::RemoteKey;
use super::overlay::OverlayId;

/// How directional keys traverse the registered positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    /// Up/Down walk the sorted positions; Left/Right are no-ops.
    Linear,
    /// Row-major grid: Up/Down step by `columns`, Left/Right by one
    /// without crossing a row boundary.
    Grid { columns: u32 },
}

/// Result of feeding one key event to a controller.
///
/// `scroll_to` carries the scroll-into-view request for the newly
/// focused handle; the presentation layer owns actual visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome<H> {
    pub activated: bool,
    pub scroll_to: Option<H>,
}

impl<H> KeyOutcome<H> {
    fn noop() -> Self {
        Self {
            activated: false,
            scroll_to: None,
        }
    }

    fn moved(handle: H) -> Self {
        Self {
            activated: false,
            scroll_to: Some(handle),
        }
    }
}

/// Converts directional/activation key events into focus transitions
/// over one overlay's [`FocusRegistry`].
///
/// The registry can shrink or grow between any two key events; the
/// controller snaps to the closest surviving position instead of
/// dangling. `Back` is never handled here, it belongs to the overlay
/// stack.
pub struct NavigationController<H> {
    mode: NavMode,
    registry: FocusRegistry<H>,
    current: Option<u32>,
}

impl<H: Clone> NavigationController<H> {
    pub fn new(scope: OverlayId, mode: NavMode) -> Self {
        if let NavMode::Grid { columns } = mode {
            debug_assert!(columns >= 1, "grid mode requires at least one column");
        }
        Self {
            mode,
            registry: FocusRegistry::new(scope),
            current: None,
        }
    }

    pub fn mode(&self) -> NavMode {
        self.mode
    }

    pub fn registry(&self) -> &FocusRegistry<H> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FocusRegistry<H> {
        &mut self.registry
    }

    /// Last resolved focus position, or `None` if nothing has been
    /// focused yet (or the registry is empty).
    pub fn current_position(&self) -> Option<u32> {
        self.current
    }

    /// Handle under the current focus position, if it still exists.
    pub fn focused_handle(&self) -> Option<&H> {
        self.current.and_then(|p| self.registry.get(p))
    }

    /// Force focus to a specific position. Ignored if the position is
    /// not registered.
    pub fn set_position(&mut self, position: u32) {
        if self.registry.contains(position) {
            self.current = Some(position);
        }
    }

    pub fn on_key(&mut self, key: RemoteKey) -> KeyOutcome<H> {
        if self.registry.is_empty() {
            self.current = None;
            return KeyOutcome::noop();
        }

        match key {
            RemoteKey::Enter => KeyOutcome {
                // Activation performs no transition; the overlay decides
                // what it means.
                activated: self.focused_handle().is_some(),
                scroll_to: None,
            },
            RemoteKey::Up | RemoteKey::Down | RemoteKey::Left | RemoteKey::Right => {
                self.move_focus(key)
            }
            // Back is reserved for the overlay stack, digits for the
            // router's numeric buffer.
            RemoteKey::Back | RemoteKey::Digit(_) => KeyOutcome::noop(),
        }
    }

    fn move_focus(&mut self, key: RemoteKey) -> KeyOutcome<H> {
        let Some(stale_or_current) = self.current else {
            // First directional key lands on the lowest position.
            let first = self
                .registry
                .first_position()
                .expect("registry checked non-empty");
            return self.focus(first);
        };

        // The focused position may have been unregistered since the
        // last event (filtering, search). Re-anchor on the closest
        // survivor before computing the step.
        let cur = if self.registry.contains(stale_or_current) {
            stale_or_current
        } else {
            let snapped = self
                .registry
                .closest_to(stale_or_current as i64)
                .expect("registry checked non-empty");
            self.current = Some(snapped);
            snapped
        };

        let next = match (self.mode, key) {
            (NavMode::Linear, RemoteKey::Up) => self.registry.prev_before(cur),
            (NavMode::Linear, RemoteKey::Down) => self.registry.next_after(cur),
            (NavMode::Linear, _) => None,
            (NavMode::Grid { columns }, RemoteKey::Up) => {
                self.registry.closest_to(cur as i64 - columns as i64)
            }
            (NavMode::Grid { columns }, RemoteKey::Down) => {
                self.registry.closest_to(cur as i64 + columns as i64)
            }
            (NavMode::Grid { columns }, RemoteKey::Left) => {
                self.registry
                    .closest_in_row(cur as i64 - 1, cur / columns, columns)
            }
            (NavMode::Grid { columns }, RemoteKey::Right) => {
                self.registry
                    .closest_in_row(cur as i64 + 1, cur / columns, columns)
            }
            _ => None,
        };

        match next {
            Some(p) if p != cur => self.focus(p),
            _ => KeyOutcome::noop(),
        }
    }

    fn focus(&mut self, position: u32) -> KeyOutcome<H> {
        self.current = Some(position);
        let handle = self
            .registry
            .get(position)
            .expect("focus target must be registered")
            .clone();
        log::debug!(
            "focus[{}]: moved to position {}",
            self.registry.scope(),
            position
        );
        KeyOutcome::moved(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(positions: &[u32]) -> NavigationController<String> {
        let mut nav = NavigationController::new(OverlayId::new("list"), NavMode::Linear);
        for &p in positions {
            nav.registry_mut().register(p, format!("item-{p}"));
        }
        nav
    }

    fn grid(positions: &[u32], columns: u32) -> NavigationController<String> {
        let mut nav =
            NavigationController::new(OverlayId::new("grid"), NavMode::Grid { columns });
        for &p in positions {
            nav.registry_mut().register(p, format!("item-{p}"));
        }
        nav
    }

    #[test]
    fn first_directional_key_focuses_lowest_position() {
        let mut nav = linear(&[2, 5, 9]);
        let out = nav.on_key(RemoteKey::Up);
        assert_eq!(nav.current_position(), Some(2));
        assert_eq!(out.scroll_to.as_deref(), Some("item-2"));
    }

    #[test]
    fn linear_walks_sorted_positions_without_wrapping() {
        let mut nav = linear(&[0, 10, 20]);
        nav.set_position(0);
        nav.on_key(RemoteKey::Down);
        assert_eq!(nav.current_position(), Some(10));
        nav.on_key(RemoteKey::Down);
        nav.on_key(RemoteKey::Down);
        assert_eq!(nav.current_position(), Some(20));
        nav.on_key(RemoteKey::Up);
        assert_eq!(nav.current_position(), Some(10));
    }

    #[test]
    fn linear_ignores_left_and_right() {
        let mut nav = linear(&[0, 1, 2]);
        nav.set_position(1);
        assert_eq!(nav.on_key(RemoteKey::Left), KeyOutcome::noop());
        assert_eq!(nav.on_key(RemoteKey::Right), KeyOutcome::noop());
        assert_eq!(nav.current_position(), Some(1));
    }

    #[test]
    fn grid_up_down_step_by_columns() {
        let mut nav = grid(&[0, 1, 2, 3, 4, 5], 3);
        nav.set_position(1);
        nav.on_key(RemoteKey::Down);
        assert_eq!(nav.current_position(), Some(4));
        nav.on_key(RemoteKey::Up);
        assert_eq!(nav.current_position(), Some(1));
    }

    #[test]
    fn grid_snaps_to_closest_when_target_missing() {
        // Second row only has position 3.
        let mut nav = grid(&[0, 1, 2, 3], 3);
        nav.set_position(2);
        nav.on_key(RemoteKey::Down); // target 5 -> closest is 3
        assert_eq!(nav.current_position(), Some(3));
    }

    #[test]
    fn grid_right_does_not_wrap_to_next_row() {
        let mut nav = grid(&[0, 1, 2, 3, 4, 5], 3);
        nav.set_position(2);
        assert_eq!(nav.on_key(RemoteKey::Right), KeyOutcome::noop());
        assert_eq!(nav.current_position(), Some(2));
    }

    #[test]
    fn grid_left_does_not_wrap_to_previous_row() {
        let mut nav = grid(&[0, 1, 2, 3, 4, 5], 3);
        nav.set_position(3);
        assert_eq!(nav.on_key(RemoteKey::Left), KeyOutcome::noop());
        assert_eq!(nav.current_position(), Some(3));
    }

    #[test]
    fn shrunken_registry_resolves_to_closest_survivor() {
        let mut nav = linear(&[0, 1, 2, 3]);
        nav.set_position(2);
        nav.registry_mut().unregister(2);
        nav.on_key(RemoteKey::Down);
        let p = nav.current_position().expect("still focused");
        assert!(p == 1 || p == 3);
        assert!(nav.registry().contains(p));
    }

    #[test]
    fn empty_registry_is_inert() {
        let mut nav = linear(&[]);
        for key in [RemoteKey::Up, RemoteKey::Down, RemoteKey::Enter] {
            let out = nav.on_key(key);
            assert!(!out.activated);
            assert!(out.scroll_to.is_none());
        }
        assert_eq!(nav.current_position(), None);
    }

    #[test]
    fn registry_emptied_mid_session_clears_focus() {
        let mut nav = linear(&[0, 1]);
        nav.set_position(1);
        nav.registry_mut().clear();
        assert!(!nav.on_key(RemoteKey::Enter).activated);
        assert_eq!(nav.current_position(), None);
    }

    #[test]
    fn enter_activates_without_moving() {
        let mut nav = linear(&[0, 1]);
        nav.set_position(1);
        let out = nav.on_key(RemoteKey::Enter);
        assert!(out.activated);
        assert!(out.scroll_to.is_none());
        assert_eq!(nav.current_position(), Some(1));
    }

    #[test]
    fn enter_on_dangling_position_does_not_activate() {
        let mut nav = linear(&[0, 1, 2]);
        nav.set_position(1);
        nav.registry_mut().unregister(1);
        assert!(!nav.on_key(RemoteKey::Enter).activated);
    }
}
