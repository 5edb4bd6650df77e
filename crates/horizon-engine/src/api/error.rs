use std::fmt;

/// Failures visible at the engine boundary.
///
/// Steady-state frame work never produces these; they only come out of
/// startup (configuration, surface probe) and pipeline construction.
#[derive(Debug)]
pub enum EngineError {
    /// The configuration JSON could not be parsed.
    Config(serde_json::Error),
    /// The host has no usable rendering surface. The collaborator should show
    /// its static fallback instead of starting the engine.
    SurfaceUnavailable,
    /// A post-processing stage list violates the fixed stage order.
    StageOrder {
        stage: &'static str,
        must_follow: &'static str,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "invalid engine config: {}", e),
            EngineError::SurfaceUnavailable => write!(f, "rendering surface unavailable"),
            EngineError::StageOrder { stage, must_follow } => {
                write!(f, "stage `{}` must come after `{}`", stage, must_follow)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_message_names_both_stages() {
        let e = EngineError::StageOrder { stage: "shadow_mask", must_follow: "bloom" };
        assert_eq!(e.to_string(), "stage `shadow_mask` must come after `bloom`");
    }

    #[test]
    fn config_error_keeps_source() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let e = EngineError::from(parse);
        assert!(std::error::Error::source(&e).is_some());
    }
}
