#![forbid(unsafe_code)]

/// Which browser object reports orientation changes.
///
/// `screen.orientation` is preferred; the `(orientation: portrait)` media
/// query list is the fallback for engines without it (older iOS Safari).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationSignal {
    ScreenOrientation,
    MediaQuery,
    Unavailable,
}

impl OrientationSignal {
    #[must_use]
    pub const fn select(has_screen_orientation: bool, has_media_query: bool) -> Self {
        if has_screen_orientation {
            Self::ScreenOrientation
        } else if has_media_query {
            Self::MediaQuery
        } else {
            Self::Unavailable
        }
    }

    /// DOM event name to listen for, if any.
    #[must_use]
    pub const fn event_name(self) -> Option<&'static str> {
        match self {
            Self::ScreenOrientation | Self::MediaQuery => Some("change"),
            Self::Unavailable => None,
        }
    }
}
