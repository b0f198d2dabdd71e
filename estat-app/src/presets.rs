//! Built-in demonstration scenes.

use estat_scene::{
    Conductor,
    ConductorShape,
    PointCharge,
    Scene,
};
use estat_solver::SorConfig;

use crate::files::SceneFile;

pub fn preset_names() -> &'static [&'static str] {
    &["dipole", "conductor-pair", "grounded-disc"]
}

pub fn preset(name: &str) -> Option<SceneFile> {
    let scene_file = match name {
        "dipole" => {
            SceneFile {
                scene: Scene {
                    charges: vec![
                        PointCharge::new(-0.25, 0.0, 1.0),
                        PointCharge::new(0.25, 0.0, -1.0),
                    ],
                    ..Default::default()
                },
                ..Default::default()
            }
        }
        "conductor-pair" => {
            SceneFile {
                scene: Scene {
                    charges: vec![PointCharge::new(0.55, 0.1, 1.0)],
                    conductors: vec![
                        Conductor {
                            shape: ConductorShape::Rectangle {
                                x_min: -0.45,
                                x_max: -0.15,
                                y_min: -0.2,
                                y_max: 0.3,
                            },
                            potential: 0.75,
                        },
                        Conductor {
                            shape: ConductorShape::Circle {
                                x: 0.2,
                                y: -0.6,
                                radius: 0.18,
                            },
                            potential: -0.4,
                        },
                    ],
                    ..Default::default()
                },
                solver: SorConfig {
                    omega: 1.75,
                    ..Default::default()
                },
                ..Default::default()
            }
        }
        "grounded-disc" => {
            SceneFile {
                scene: Scene {
                    charges: vec![PointCharge::new(-0.5, 0.0, 1.0)],
                    conductors: vec![Conductor {
                        shape: ConductorShape::Circle {
                            x: 0.35,
                            y: 0.0,
                            radius: 0.25,
                        },
                        potential: 0.0,
                    }],
                    ..Default::default()
                },
                ..Default::default()
            }
        }
        _ => return None,
    };

    Some(scene_file)
}
