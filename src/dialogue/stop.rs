//! Stop-condition detection
//!
//! A reply ends the dialogue when it contains the marker anywhere. Matching
//! is a plain case-sensitive substring test, so a persona that merely talks
//! about the marker also ends the discussion.

/// Literal termination marker
pub const STOP_MARKER: &str = "END_CONVERSATION";

/// Inspects generated text for the termination marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopConditionDetector {
    marker: String,
}

impl StopConditionDetector {
    pub fn new() -> Self {
        Self::with_marker(STOP_MARKER)
    }

    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn has_stop_signal(&self, text: &str) -> bool {
        text.contains(&self.marker)
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Default for StopConditionDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_anywhere() {
        let detector = StopConditionDetector::new();
        assert!(detector.has_stop_signal("END_CONVERSATION"));
        assert!(detector.has_stop_signal("I think we're done. END_CONVERSATION."));
        assert!(detector.has_stop_signal("xxEND_CONVERSATIONxx"));
    }

    #[test]
    fn test_case_sensitive() {
        let detector = StopConditionDetector::new();
        assert!(!detector.has_stop_signal("end_conversation"));
        assert!(!detector.has_stop_signal("End Conversation"));
    }

    #[test]
    fn test_partial_marker_ignored() {
        let detector = StopConditionDetector::new();
        assert!(!detector.has_stop_signal("END_CONVERSATIO"));
        assert!(!detector.has_stop_signal(""));
    }

    #[test]
    fn test_quoted_marker_still_stops() {
        let detector = StopConditionDetector::new();
        assert!(detector.has_stop_signal("Should we say 'END_CONVERSATION' yet? Not yet."));
    }

    #[test]
    fn test_custom_marker() {
        let detector = StopConditionDetector::with_marker("<<DONE>>");
        assert!(detector.has_stop_signal("ok <<DONE>>"));
        assert!(!detector.has_stop_signal("END_CONVERSATION"));
        assert_eq!(detector.marker(), "<<DONE>>");
    }
}
