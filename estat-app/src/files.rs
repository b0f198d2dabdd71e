use std::path::Path;

use color_eyre::eyre::{
    Error,
    bail,
};
use estat_scene::Scene;
use estat_solver::{
    GridSpec,
    SorConfig,
};
use serde::{
    Deserialize,
    Serialize,
};

/// On-disk problem statement: a scene plus grid and solver settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneFile {
    pub scene: Scene,

    #[serde(default)]
    pub grid: GridSpec,

    #[serde(default)]
    pub solver: SorConfig,
}

#[derive(Clone, Copy, Debug)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn from_path_or_bail(path: &Path) -> Result<Self, Error> {
        match Self::from_path(path) {
            Some(format) => Ok(format),
            None => bail!("can't tell the format of {}; use .toml or .json", path.display()),
        }
    }
}

pub fn load_scene_file(path: &Path) -> Result<SceneFile, Error> {
    let contents = std::fs::read_to_string(path)?;

    let scene_file = match FileFormat::from_path_or_bail(path)? {
        FileFormat::Toml => toml::from_str(&contents)?,
        FileFormat::Json => serde_json::from_str(&contents)?,
    };

    Ok(scene_file)
}

pub fn save_pretty<T>(path: &Path, value: &T) -> Result<(), Error>
where
    T: Serialize,
{
    let contents = match FileFormat::from_path_or_bail(path)? {
        FileFormat::Toml => toml::to_string_pretty(value)?,
        FileFormat::Json => serde_json::to_string_pretty(value)?,
    };

    std::fs::write(path, contents)?;
    Ok(())
}
