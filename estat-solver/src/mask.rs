use estat_scene::Conductor;

use crate::{
    grid::Grid,
    lattice::Lattice,
};

/// Per-node Dirichlet mask: `Some(v)` pins a node to potential `v` for
/// the whole solve.
///
/// A node is masked iff its world coordinate lies inside a conductor;
/// when conductors overlap, the one declared last in the scene wins.
/// The mask is rebuilt from scratch on every solve and never mutated
/// during iteration.
#[derive(Clone, Debug)]
pub struct DirichletMask {
    cells: Lattice<Option<f32>>,
}

impl DirichletMask {
    pub fn build(grid: &Grid, conductors: &[Conductor]) -> Self {
        let mut cells = Lattice::from_value(grid, None);

        for conductor in conductors {
            let Some((x0, x1)) = grid.nodes_covering(&conductor.shape.bounding_box())
            else {
                continue;
            };

            for (index, point) in grid.iter(x0..=x1) {
                if conductor.shape.contains(&grid.world_point(&point)) {
                    cells[index] = Some(conductor.potential as f32);
                }
            }
        }

        Self { cells }
    }

    pub fn fixed(&self, index: usize) -> Option<f32> {
        self.cells[index]
    }

    pub fn is_masked(&self, index: usize) -> bool {
        self.cells[index].is_some()
    }

    pub fn masked_count(&self) -> usize {
        self.cells
            .as_slice()
            .iter()
            .filter(|cell| cell.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use estat_scene::{
        Conductor,
        ConductorShape,
        DomainBounds,
    };
    use nalgebra::Point2;

    use crate::{
        grid::{
            Grid,
            GridSpec,
        },
        mask::DirichletMask,
    };

    fn grid() -> Grid {
        Grid::new(&DomainBounds::default(), &GridSpec { nx: 41, ny: 41 }).unwrap()
    }

    #[test]
    fn rectangle_masks_edge_nodes_inclusively() {
        let grid = grid();
        // dx = 0.05; the rectangle edges land exactly on nodes
        let mask = DirichletMask::build(
            &grid,
            &[Conductor {
                shape: ConductorShape::Rectangle {
                    x_min: -0.5,
                    x_max: 0.0,
                    y_min: -0.25,
                    y_max: 0.25,
                },
                potential: 0.75,
            }],
        );

        // corners of the rectangle, in node indices
        for point in [
            Point2::new(10, 15),
            Point2::new(20, 15),
            Point2::new(10, 25),
            Point2::new(20, 25),
            Point2::new(15, 20),
        ] {
            assert_eq!(mask.fixed(grid.index(&point)), Some(0.75));
        }

        // just outside
        assert_eq!(mask.fixed(grid.index(&Point2::new(9, 20))), None);
        assert_eq!(mask.fixed(grid.index(&Point2::new(21, 20))), None);
        assert_eq!(mask.fixed(grid.index(&Point2::new(15, 14))), None);
        assert_eq!(mask.fixed(grid.index(&Point2::new(15, 26))), None);
    }

    #[test]
    fn circle_masks_by_squared_distance() {
        let grid = grid();
        let mask = DirichletMask::build(
            &grid,
            &[Conductor {
                shape: ConductorShape::Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: 0.3,
                },
                potential: -0.4,
            }],
        );

        let center = grid.index(&Point2::new(20, 20));
        assert_eq!(mask.fixed(center), Some(-0.4));

        // node at distance 0.25 is inside
        assert_eq!(mask.fixed(grid.index(&Point2::new(25, 20))), Some(-0.4));
        // node at distance 0.35 is outside
        assert_eq!(mask.fixed(grid.index(&Point2::new(27, 20))), None);
        // diagonal node at distance sqrt(2)*0.25 > 0.3
        assert_eq!(mask.fixed(grid.index(&Point2::new(25, 25))), None);
    }

    #[test]
    fn later_conductors_win_on_overlap() {
        let grid = grid();
        let square = |potential| {
            Conductor {
                shape: ConductorShape::Rectangle {
                    x_min: -0.25,
                    x_max: 0.25,
                    y_min: -0.25,
                    y_max: 0.25,
                },
                potential,
            }
        };

        let mask = DirichletMask::build(&grid, &[square(1.0), square(-1.0)]);
        assert_eq!(mask.fixed(grid.index(&Point2::new(20, 20))), Some(-1.0));

        let mask = DirichletMask::build(&grid, &[square(-1.0), square(1.0)]);
        assert_eq!(mask.fixed(grid.index(&Point2::new(20, 20))), Some(1.0));
    }

    #[test]
    fn empty_scene_masks_nothing() {
        let grid = grid();
        let mask = DirichletMask::build(&grid, &[]);
        assert_eq!(mask.masked_count(), 0);
    }

    #[test]
    fn off_grid_conductor_masks_nothing() {
        let grid = grid();
        let mask = DirichletMask::build(
            &grid,
            &[Conductor {
                shape: ConductorShape::Circle {
                    x: 5.0,
                    y: 5.0,
                    radius: 0.5,
                },
                potential: 1.0,
            }],
        );
        assert_eq!(mask.masked_count(), 0);
    }
}
