/// Logical remote-control key, already normalized from vendor scan codes.
///
/// The hardware layer is expected to hand the router raw key names
/// (browser-style `"ArrowUp"`, Tizen-style `"XF86Back"`, plain digits);
/// everything past the router speaks in terms of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Back,
    Digit(u8),
}

impl RemoteKey {
    /// Normalize a raw key name into a logical key.
    ///
    /// Unknown names return `None` and are dropped by the router.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "Up" | "ArrowUp" => Some(Self::Up),
            "Down" | "ArrowDown" => Some(Self::Down),
            "Left" | "ArrowLeft" => Some(Self::Left),
            "Right" | "ArrowRight" => Some(Self::Right),
            "Enter" | "Return" | "Select" | "OK" => Some(Self::Enter),
            "Back" | "Escape" | "Backspace" | "XF86Back" => Some(Self::Back),
            _ => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_digit() => {
                        Some(Self::Digit(c as u8 - b'0'))
                    }
                    _ => None,
                }
            }
        }
    }

    pub fn is_directional(&self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}
