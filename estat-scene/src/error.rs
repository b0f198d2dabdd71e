#[derive(Clone, Copy, Debug, thiserror::Error)]
pub enum SceneError {
    #[error("invalid domain: {reason}")]
    InvalidDomain { reason: &'static str },

    #[error("invalid conductor #{index}: {reason}")]
    InvalidConductor {
        index: usize,
        reason: &'static str,
    },
}
