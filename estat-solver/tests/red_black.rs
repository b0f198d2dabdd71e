//! The rayon backend sweeps in red-black order instead of the
//! lexicographic reference, so its convergence curve differs; the
//! converged fields must still agree on a relaxed, range-normalized
//! tolerance.

#![cfg(feature = "rayon")]

use estat_scene::{
    Conductor,
    ConductorShape,
    PointCharge,
    Scene,
};
use estat_solver::{
    GridSpec,
    SorConfig,
    SorSolver,
};

#[test]
fn red_black_converges_to_the_lexicographic_field() {
    let scene = Scene {
        charges: vec![
            PointCharge::new(-0.25, 0.0, 1.0),
            PointCharge::new(0.25, 0.0, -1.0),
        ],
        conductors: vec![Conductor {
            shape: ConductorShape::Circle {
                x: 0.0,
                y: 0.5,
                radius: 0.2,
            },
            potential: 0.3,
        }],
        ..Default::default()
    };
    let grid = GridSpec { nx: 101, ny: 101 };
    let config = SorConfig {
        max_iters: 4000,
        tolerance: 1e-6,
        omega: 1.7,
        charge_sigma_cells: 1.0,
    };

    let reference = SorSolver::single_threaded()
        .solve(&scene, &grid, &config)
        .unwrap();
    let parallel = SorSolver::multi_threaded(Some(4))
        .unwrap()
        .solve(&scene, &grid, &config)
        .unwrap();

    let range = f64::from(reference.phi_max) - f64::from(reference.phi_min);
    assert!(range > 0.0);

    let mut worst = 0.0f64;
    for (a, b) in reference.phi.iter().zip(&parallel.phi) {
        worst = worst.max((f64::from(*a) - f64::from(*b)).abs());
    }
    assert!(
        worst / range <= 1e-3,
        "normalized field mismatch {}",
        worst / range
    );
}

#[test]
fn red_black_preserves_masked_and_ring_invariants() {
    let scene = Scene {
        charges: vec![PointCharge::new(-0.6, 0.0, 1.0)],
        conductors: vec![Conductor {
            shape: ConductorShape::Rectangle {
                x_min: 0.1,
                x_max: 0.5,
                y_min: -0.3,
                y_max: 0.2,
            },
            potential: 0.75,
        }],
        ..Default::default()
    };
    let result = SorSolver::multi_threaded(Some(4))
        .unwrap()
        .solve(
            &scene,
            &GridSpec { nx: 101, ny: 101 },
            &SorConfig {
                max_iters: 1500,
                ..Default::default()
            },
        )
        .unwrap();

    let shape = scene.conductors[0].shape;
    let dx = (result.x_max - result.x_min) / (result.nx - 1) as f64;
    let dy = (result.y_max - result.y_min) / (result.ny - 1) as f64;
    for j in 0..result.ny {
        for i in 0..result.nx {
            let world = nalgebra::Point2::new(
                result.x_min + i as f64 * dx,
                result.y_min + j as f64 * dy,
            );
            if shape.contains(&world) {
                assert_eq!(result.phi_at(i, j), 0.75);
            }
        }
    }

    for j in 0..result.ny {
        assert_eq!(result.phi_at(0, j), result.phi_at(1, j));
        assert_eq!(result.phi_at(result.nx - 1, j), result.phi_at(result.nx - 2, j));
    }
    for i in 0..result.nx {
        assert_eq!(result.phi_at(i, 0), result.phi_at(i, 1));
        assert_eq!(result.phi_at(i, result.ny - 1), result.phi_at(i, result.ny - 2));
    }
}
