use std::borrow::Cow;

use chrono::{
    DateTime,
    Local,
};
use estat_scene::Scene;
use estat_solver::{
    GridSpec,
    SolveResult,
    SorConfig,
};
use estat_util::fingerprint::phi_fingerprint;
use serde::{
    Deserialize,
    Serialize,
};

use crate::files::SceneFile;

pub const MAGIC: &str = "estat-project";
pub const VERSION: u64 = 0;

/// Persisted snapshot of a problem and (optionally) its solution.
///
/// The potential itself lives in the raw dump next to this file; the
/// snapshot carries its fingerprint so a loader can tell whether the
/// dump still matches the settings.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectFileData {
    pub magic: Cow<'static, str>,
    pub version: u64,
    pub save_timestamp: DateTime<Local>,

    pub scene: Scene,
    pub grid: GridSpec,
    pub solver: SorConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<SolutionSnapshot>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolutionSnapshot {
    pub iterations: usize,
    pub residual: f64,
    pub phi_min: f32,
    pub phi_max: f32,

    /// 8-hex-digit FNV-1a over φ (and only φ).
    pub phi_fingerprint: String,
}

impl ProjectFileData {
    pub fn new(scene_file: &SceneFile, solution: Option<SolutionSnapshot>) -> Self {
        Self {
            magic: MAGIC.into(),
            version: VERSION,
            save_timestamp: Local::now(),
            scene: scene_file.scene.clone(),
            grid: scene_file.grid,
            solver: scene_file.solver,
            solution,
        }
    }
}

impl SolutionSnapshot {
    pub fn from_result(result: &SolveResult) -> Self {
        Self {
            iterations: result.iterations,
            residual: result.residual,
            phi_min: result.phi_min,
            phi_max: result.phi_max,
            phi_fingerprint: phi_fingerprint(&result.phi),
        }
    }
}
