//! Gaussian deposition of point charges into a grid density.
//!
//! Each charge is rasterized as a truncated, renormalized Gaussian
//! stamp so that the integrated density over the stamp equals the
//! charge exactly, no matter how the stamp was clipped at the grid
//! boundary.

use estat_scene::PointCharge;
use nalgebra::{
    Point2,
    Vector2,
};

use crate::{
    grid::{
        Grid,
        iter_points,
    },
    lattice::Lattice,
};

/// Lower bound on the stamp width in cells.
pub const MIN_SIGMA_CELLS: f64 = 0.25;

/// Builds the charge density ρ for a set of point charges.
///
/// Charges superpose additively. A charge with a non-finite position
/// or value, or whose nearest node lies outside the grid, is skipped.
pub fn deposit_charges(grid: &Grid, charges: &[PointCharge], sigma_cells: f64) -> Lattice<f32> {
    let mut rho = Lattice::from_value(grid, 0.0f32);

    for charge in charges {
        deposit_charge(grid, &mut rho, charge, sigma_cells);
    }

    rho
}

fn deposit_charge(grid: &Grid, rho: &mut Lattice<f32>, charge: &PointCharge, sigma_cells: f64) {
    if !charge.is_finite() {
        tracing::debug!(?charge, "skipping non-finite charge");
        return;
    }

    let world = Point2::new(charge.x, charge.y);
    let Some(center) = grid.nearest_node(&world)
    else {
        tracing::debug!(?charge, "skipping charge outside the grid");
        return;
    };

    // max on the NaN side returns the floor, so a NaN width falls back
    // to the minimum stamp
    let sigma = Vector2::new(
        grid.dx().max(1e-9) * MIN_SIGMA_CELLS.max(sigma_cells),
        grid.dy().max(1e-9) * MIN_SIGMA_CELLS.max(sigma_cells),
    );

    // truncate the stamp at 3 sigma
    let radius = Vector2::new(
        (3.0 * sigma.x / grid.dx()).ceil() as usize,
        (3.0 * sigma.y / grid.dy()).ceil() as usize,
    );

    let x0 = Point2::new(
        center.x.saturating_sub(radius.x),
        center.y.saturating_sub(radius.y),
    );
    let x1 = Point2::new(
        center.x.saturating_add(radius.x).min(grid.nx() - 1),
        center.y.saturating_add(radius.y).min(grid.ny() - 1),
    );

    let weight = |point: &Point2<usize>| -> f64 {
        let node = grid.world_point(point);
        let u = (node.x - world.x) / sigma.x;
        let v = (node.y - world.y) / sigma.y;
        (-0.5 * (u * u + v * v)).exp()
    };

    let mut weight_sum = 0.0f64;
    for point in iter_points(x0..=x1, *grid.size()) {
        weight_sum += weight(&point);
    }

    if weight_sum <= 0.0 {
        tracing::debug!(?charge, "skipping charge with degenerate stamp");
        return;
    }

    // normalizing by the clipped weight sum keeps the integral of the
    // stamp equal to q even at the domain edge
    let scale = charge.q / (weight_sum * grid.dx() * grid.dy());

    for (index, point) in grid.iter(x0..=x1) {
        rho[index] += (scale * weight(&point)) as f32;
    }
}

/// Integral of a density lattice over the grid, for conservation
/// checks.
pub fn integrate(grid: &Grid, rho: &Lattice<f32>) -> f64 {
    let cell_area = grid.dx() * grid.dy();
    rho.as_slice().iter().map(|&r| f64::from(r)).sum::<f64>() * cell_area
}
