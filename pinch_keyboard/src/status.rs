//! The single status line shown to the user.

use crate::visualizer::palette;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Starting,
    CameraAcquired,
    /// A hand is in view.
    Tracking,
    /// Frames arrive but contain no hand.
    Searching,
    /// The source finished (end of a recording or pipe).
    FeedEnded,
    /// Capture failed.  Terminal: no later event changes it.
    CameraDenied(String),
}

impl Status {
    pub fn message(&self) -> &'static str {
        match self {
            Status::Starting        => "Initializing...",
            Status::CameraAcquired  => "Camera Feed Acquired...",
            Status::Tracking        => "Targeting System // Locked",
            Status::Searching       => "Searching for Pilot...",
            Status::FeedEnded       => "Feed Ended",
            Status::CameraDenied(_) => "Error: Camera Access Denied",
        }
    }

    /// The underlying failure, shown under the message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Status::CameraDenied(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Status::Tracking                      => palette::CYAN,
            Status::Searching | Status::FeedEnded => palette::DIM,
            Status::CameraDenied(_)               => palette::RED,
            _                                     => palette::TEXT,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::CameraDenied(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(Status::CameraAcquired.message(), "Camera Feed Acquired...");
        assert_eq!(Status::Tracking.message(), "Targeting System // Locked");
        assert_eq!(Status::Searching.message(), "Searching for Pilot...");
        let denied = Status::CameraDenied("permission denied".into());
        assert_eq!(denied.message(), "Error: Camera Access Denied");
        assert_eq!(denied.detail(), Some("permission denied"));
    }

    #[test]
    fn only_denied_is_terminal() {
        assert!(Status::CameraDenied(String::new()).is_terminal());
        assert!(!Status::FeedEnded.is_terminal());
        assert!(!Status::default().is_terminal());
    }

    #[test]
    fn colors() {
        assert_eq!(Status::Tracking.color(), palette::CYAN);
        assert_eq!(Status::CameraDenied(String::new()).color(), palette::RED);
        assert_eq!(Status::Searching.color(), palette::DIM);
    }
}
