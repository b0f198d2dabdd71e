use estat_scene::SceneError;

#[derive(Clone, Copy, Debug, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: &'static str },
}
