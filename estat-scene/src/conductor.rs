use nalgebra::Point2;
use serde::{
    Deserialize,
    Serialize,
};

use crate::error::SceneError;

/// A fixed-potential region embedded in the domain.
///
/// Every grid node whose world coordinate lies inside the shape is
/// held at `potential` for the whole solve (Dirichlet condition).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Conductor {
    #[serde(flatten)]
    pub shape: ConductorShape,
    pub potential: f64,
}

impl Conductor {
    pub(crate) fn validate(&self, index: usize) -> Result<(), SceneError> {
        if !self.potential.is_finite() {
            return Err(SceneError::InvalidConductor {
                index,
                reason: "potential must be finite",
            });
        }

        self.shape.validate(index)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ConductorShape {
    Rectangle {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
}

impl ConductorShape {
    fn validate(&self, index: usize) -> Result<(), SceneError> {
        match self {
            ConductorShape::Rectangle {
                x_min,
                x_max,
                y_min,
                y_max,
            } => {
                let all_finite = [x_min, x_max, y_min, y_max].iter().all(|x| x.is_finite());
                if !all_finite {
                    return Err(SceneError::InvalidConductor {
                        index,
                        reason: "rectangle bounds must be finite",
                    });
                }
                if x_max <= x_min || y_max <= y_min {
                    return Err(SceneError::InvalidConductor {
                        index,
                        reason: "rectangle bounds are inverted",
                    });
                }
            }
            ConductorShape::Circle { x, y, radius } => {
                if !x.is_finite() || !y.is_finite() || !radius.is_finite() {
                    return Err(SceneError::InvalidConductor {
                        index,
                        reason: "circle parameters must be finite",
                    });
                }
                if *radius <= 0.0 {
                    return Err(SceneError::InvalidConductor {
                        index,
                        reason: "circle radius must be positive",
                    });
                }
            }
        }

        Ok(())
    }

    /// Containment test against a node-center world coordinate.
    ///
    /// Rectangles are inclusive on all four edges and circles include
    /// their boundary, so a node exactly on the outline is masked.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        match self {
            ConductorShape::Rectangle {
                x_min,
                x_max,
                y_min,
                y_max,
            } => {
                point.x >= *x_min && point.x <= *x_max && point.y >= *y_min && point.y <= *y_max
            }
            ConductorShape::Circle { x, y, radius } => {
                let dx = point.x - x;
                let dy = point.y - y;
                dx * dx + dy * dy <= radius * radius
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            ConductorShape::Rectangle {
                x_min,
                x_max,
                y_min,
                y_max,
            } => {
                Aabb {
                    min: Point2::new(*x_min, *y_min),
                    max: Point2::new(*x_max, *y_max),
                }
            }
            ConductorShape::Circle { x, y, radius } => {
                Aabb {
                    min: Point2::new(x - radius, y - radius),
                    max: Point2::new(x + radius, y + radius),
                }
            }
        }
    }
}

/// Axis-aligned bounding box in world coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use crate::ConductorShape;

    #[test]
    fn rectangle_containment_is_edge_inclusive() {
        let shape = ConductorShape::Rectangle {
            x_min: -0.5,
            x_max: 0.5,
            y_min: -0.25,
            y_max: 0.25,
        };

        assert!(shape.contains(&Point2::new(0.0, 0.0)));
        assert!(shape.contains(&Point2::new(-0.5, 0.25)));
        assert!(shape.contains(&Point2::new(0.5, -0.25)));
        assert!(!shape.contains(&Point2::new(0.5000001, 0.0)));
        assert!(!shape.contains(&Point2::new(0.0, -0.26)));
    }

    #[test]
    fn circle_containment_includes_the_boundary() {
        let shape = ConductorShape::Circle {
            x: 1.0,
            y: -1.0,
            radius: 0.5,
        };

        assert!(shape.contains(&Point2::new(1.0, -1.0)));
        assert!(shape.contains(&Point2::new(1.5, -1.0)));
        assert!(shape.contains(&Point2::new(1.0, -0.5)));
        assert!(!shape.contains(&Point2::new(1.36, -0.64)));
    }

    #[test]
    fn bounding_boxes_cover_the_shape() {
        let circle = ConductorShape::Circle {
            x: 0.2,
            y: -0.1,
            radius: 0.28,
        };
        let aabb = circle.bounding_box();
        assert_eq!(aabb.min, Point2::new(-0.08, -0.38));
        assert_eq!(aabb.max, Point2::new(0.48, 0.18));
    }
}
