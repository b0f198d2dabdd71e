//! End-to-end solves against the properties the solver guarantees:
//! conductor potentials are held exactly, the outer ring satisfies the
//! Neumann copy condition, fields inherit the symmetries of their
//! sources, and residuals fall monotonically for well-posed scenes.

use estat_scene::{
    Conductor,
    ConductorShape,
    DomainBounds,
    PointCharge,
    Scene,
};
use estat_solver::{
    GridSpec,
    SorConfig,
    SorSolver,
};
use nalgebra::Point2;

fn unit_domain() -> DomainBounds {
    DomainBounds {
        x_min: -1.0,
        x_max: 1.0,
        y_min: -1.0,
        y_max: 1.0,
        epsilon: 1.0,
    }
}

fn world_point(result: &estat_solver::SolveResult, i: usize, j: usize) -> Point2<f64> {
    let dx = (result.x_max - result.x_min) / (result.nx - 1) as f64;
    let dy = (result.y_max - result.y_min) / (result.ny - 1) as f64;
    Point2::new(
        result.x_min + i as f64 * dx,
        result.y_min + j as f64 * dy,
    )
}

#[test]
fn neumann_ring_is_exact_after_solve() {
    let scene = Scene {
        domain: unit_domain(),
        charges: vec![PointCharge::new(0.3, 0.2, 1.0)],
        conductors: vec![],
    };
    let result = SorSolver::single_threaded()
        .solve(
            &scene,
            &GridSpec { nx: 101, ny: 101 },
            &SorConfig {
                max_iters: 500,
                ..Default::default()
            },
        )
        .unwrap();

    let nx = result.nx;
    let ny = result.ny;
    for j in 0..ny {
        assert_eq!(result.phi_at(0, j), result.phi_at(1, j));
        assert_eq!(result.phi_at(nx - 1, j), result.phi_at(nx - 2, j));
    }
    for i in 0..nx {
        assert_eq!(result.phi_at(i, 0), result.phi_at(i, 1));
        assert_eq!(result.phi_at(i, ny - 1), result.phi_at(i, ny - 2));
    }
}

#[test]
fn dipole_field_is_antisymmetric_and_residual_falls() {
    let scene = Scene {
        domain: unit_domain(),
        charges: vec![
            PointCharge::new(-0.25, 0.0, 1.0),
            PointCharge::new(0.25, 0.0, -1.0),
        ],
        conductors: vec![],
    };
    let config = SorConfig {
        max_iters: 4000,
        tolerance: 1e-5,
        omega: 1.7,
        charge_sigma_cells: 1.0,
    };

    let mut history = Vec::new();
    let result = SorSolver::single_threaded()
        .solve_with_history(&scene, &GridSpec { nx: 201, ny: 201 }, &config, &mut history)
        .unwrap();

    // mirroring x negates the field
    let nx = result.nx;
    let mut worst = 0.0f32;
    for j in 1..result.ny - 1 {
        for i in 1..nx - 1 {
            let sum = result.phi_at(i, j) + result.phi_at(nx - 1 - i, j);
            worst = worst.max(sum.abs());
        }
    }
    assert!(worst < 1e-3, "antisymmetry defect {worst}");

    // sampled residuals decrease monotonically for omega in the
    // stable range
    assert!(!history.is_empty());
    for pair in history.windows(2) {
        assert!(
            pair[1] <= pair[0] + 1e-8,
            "residual rose from {} to {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn centered_charge_field_is_mirror_symmetric() {
    let scene = Scene {
        domain: unit_domain(),
        charges: vec![PointCharge::new(0.0, 0.0, 1.0)],
        conductors: vec![],
    };
    let config = SorConfig {
        max_iters: 3000,
        tolerance: 5e-6,
        omega: 1.7,
        charge_sigma_cells: 1.0,
    };

    let result = SorSolver::single_threaded()
        .solve(&scene, &GridSpec { nx: 201, ny: 201 }, &config)
        .unwrap();

    let nx = result.nx;
    let ny = result.ny;
    let mut worst_x = 0.0f32;
    let mut worst_y = 0.0f32;
    for j in 0..ny {
        for i in 0..nx {
            worst_x = worst_x.max((result.phi_at(i, j) - result.phi_at(nx - 1 - i, j)).abs());
            worst_y = worst_y.max((result.phi_at(i, j) - result.phi_at(i, ny - 1 - j)).abs());
        }
    }
    assert!(worst_x < 1e-3, "x mirror defect {worst_x}");
    assert!(worst_y < 1e-3, "y mirror defect {worst_y}");
}

#[test]
fn rectangle_conductor_holds_its_potential() {
    let shape = ConductorShape::Rectangle {
        x_min: -0.45,
        x_max: -0.15,
        y_min: -0.2,
        y_max: 0.3,
    };
    let scene = Scene {
        domain: unit_domain(),
        charges: vec![PointCharge::new(0.55, 0.1, 1.0)],
        conductors: vec![Conductor {
            shape,
            potential: 0.75,
        }],
    };
    let config = SorConfig {
        max_iters: 2500,
        tolerance: 1e-5,
        omega: 1.75,
        charge_sigma_cells: 1.0,
    };

    let result = SorSolver::single_threaded()
        .solve(&scene, &GridSpec { nx: 181, ny: 181 }, &config)
        .unwrap();

    let mut inside = 0;
    for j in 0..result.ny {
        for i in 0..result.nx {
            if shape.contains(&world_point(&result, i, j)) {
                inside += 1;
                assert!(
                    (result.phi_at(i, j) - 0.75).abs() < 1e-6,
                    "node ({i}, {j}) drifted to {}",
                    result.phi_at(i, j)
                );
            }
        }
    }
    assert!(inside > 0);
}

#[test]
fn circle_conductor_holds_its_potential() {
    let shape = ConductorShape::Circle {
        x: 0.2,
        y: -0.1,
        radius: 0.28,
    };
    let scene = Scene {
        domain: unit_domain(),
        charges: vec![PointCharge::new(-0.6, 0.0, 1.0)],
        conductors: vec![Conductor {
            shape,
            potential: -0.4,
        }],
    };
    let config = SorConfig {
        max_iters: 2500,
        tolerance: 1e-5,
        omega: 1.75,
        charge_sigma_cells: 1.0,
    };

    let result = SorSolver::single_threaded()
        .solve(&scene, &GridSpec { nx: 201, ny: 201 }, &config)
        .unwrap();

    let mut inside = 0;
    for j in 0..result.ny {
        for i in 0..result.nx {
            if shape.contains(&world_point(&result, i, j)) {
                inside += 1;
                assert!(
                    (result.phi_at(i, j) - (-0.4)).abs() < 1e-6,
                    "node ({i}, {j}) drifted to {}",
                    result.phi_at(i, j)
                );
            }
        }
    }
    assert!(inside > 0);
}

#[test]
fn non_positive_epsilon_behaves_like_unit() {
    let charges = vec![PointCharge::new(0.1, -0.2, 1.0)];
    let grid = GridSpec { nx: 64, ny: 64 };
    let config = SorConfig {
        max_iters: 200,
        ..Default::default()
    };

    let solve = |epsilon| {
        SorSolver::single_threaded()
            .solve(
                &Scene {
                    domain: DomainBounds {
                        epsilon,
                        ..unit_domain()
                    },
                    charges: charges.clone(),
                    conductors: vec![],
                },
                &grid,
                &config,
            )
            .unwrap()
    };

    let unit = solve(1.0);
    for fallback in [solve(0.0), solve(-3.0), solve(f64::NAN)] {
        assert_eq!(
            unit.phi.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            fallback.phi.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        );
    }
}
