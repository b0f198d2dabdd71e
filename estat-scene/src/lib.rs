#![warn(unused_qualifications)]

//! Scene description for the electrostatic solver.
//!
//! A [`Scene`] is the complete problem statement: the rectangular
//! domain, the point charges embedded in it and the fixed-potential
//! conductors. It is plain data; all numerics live in `estat-solver`.

mod conductor;
mod error;

use serde::{
    Deserialize,
    Serialize,
};

pub use crate::{
    conductor::{
        Aabb,
        Conductor,
        ConductorShape,
    },
    error::SceneError,
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scene {
    pub domain: DomainBounds,

    #[serde(default)]
    pub charges: Vec<PointCharge>,

    #[serde(default)]
    pub conductors: Vec<Conductor>,
}

impl Scene {
    /// Checks everything that can't be sanitized by clamping.
    ///
    /// Charges are deliberately not validated here: a non-finite or
    /// out-of-domain charge is skipped during deposition instead of
    /// failing the whole solve.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.domain.validate()?;

        for (index, conductor) in self.conductors.iter().enumerate() {
            conductor.validate(index)?;
        }

        Ok(())
    }
}

/// Rectangular solve domain with a uniform permittivity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DomainBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,

    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl DomainBounds {
    pub fn validate(&self) -> Result<(), SceneError> {
        let all_finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|x| x.is_finite());
        if !all_finite {
            return Err(SceneError::InvalidDomain {
                reason: "bounds must be finite",
            });
        }

        if self.x_max <= self.x_min || self.y_max <= self.y_min {
            return Err(SceneError::InvalidDomain {
                reason: "max bound must exceed min bound",
            });
        }

        Ok(())
    }

    /// Permittivity with the documented fallback: non-positive or
    /// non-finite values are silently replaced by 1.
    pub fn permittivity(&self) -> f64 {
        if self.epsilon.is_finite() && self.epsilon > 0.0 {
            self.epsilon
        }
        else {
            1.0
        }
    }
}

impl Default for DomainBounds {
    fn default() -> Self {
        Self {
            x_min: -1.0,
            x_max: 1.0,
            y_min: -1.0,
            y_max: 1.0,
            epsilon: default_epsilon(),
        }
    }
}

fn default_epsilon() -> f64 {
    1.0
}

/// A point charge at a world position. `q` may be negative.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PointCharge {
    pub x: f64,
    pub y: f64,
    pub q: f64,
}

impl PointCharge {
    pub fn new(x: f64, y: f64, q: f64) -> Self {
        Self { x, y, q }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.q.is_finite()
    }
}
