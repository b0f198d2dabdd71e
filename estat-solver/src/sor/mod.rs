pub mod sweep;

use estat_scene::Scene;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    deposit::deposit_charges,
    error::SolveError,
    grid::{
        Grid,
        GridSpec,
    },
    lattice::Lattice,
    mask::DirichletMask,
    sor::sweep::{
        SingleThreaded,
        Stencil,
        Sweep,
        apply_neumann_boundary,
    },
};

pub const OMEGA_MIN: f64 = 0.1;
pub const OMEGA_MAX: f64 = 1.99;
pub const TOLERANCE_FLOOR: f64 = 1e-10;
pub const MAX_ITERS_LIMIT: usize = 200_000;

/// How many sweeps pass between residual samples.
const RESIDUAL_SAMPLE_INTERVAL: usize = 10;

/// Iteration parameters for one solve.
///
/// Out-of-range values are clamped rather than rejected; only
/// non-finite tolerance or omega fail the solve.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SorConfig {
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_omega")]
    pub omega: f64,

    #[serde(default = "default_charge_sigma_cells")]
    pub charge_sigma_cells: f64,
}

impl Default for SorConfig {
    fn default() -> Self {
        Self {
            max_iters: default_max_iters(),
            tolerance: default_tolerance(),
            omega: default_omega(),
            charge_sigma_cells: default_charge_sigma_cells(),
        }
    }
}

impl SorConfig {
    fn sanitized(&self) -> Result<Self, SolveError> {
        if !self.tolerance.is_finite() {
            return Err(SolveError::InvalidParameter {
                reason: "tolerance must be finite",
            });
        }
        if !self.omega.is_finite() {
            return Err(SolveError::InvalidParameter {
                reason: "omega must be finite",
            });
        }

        let sanitized = Self {
            max_iters: self.max_iters.clamp(1, MAX_ITERS_LIMIT),
            tolerance: self.tolerance.max(TOLERANCE_FLOOR),
            omega: self.omega.clamp(OMEGA_MIN, OMEGA_MAX),
            charge_sigma_cells: self.charge_sigma_cells,
        };

        if sanitized.max_iters != self.max_iters
            || sanitized.tolerance != self.tolerance
            || sanitized.omega != self.omega
        {
            tracing::warn!(requested = ?self, clamped = ?sanitized, "clamping solver parameters");
        }

        Ok(sanitized)
    }
}

fn default_max_iters() -> usize {
    2500
}

fn default_tolerance() -> f64 {
    1e-5
}

fn default_omega() -> f64 {
    1.7
}

fn default_charge_sigma_cells() -> f64 {
    1.0
}

/// The solved potential together with its grid metadata and
/// convergence data.
#[derive(Clone, Debug)]
pub struct SolveResult {
    /// Row-major, `ny` rows of `nx` nodes.
    pub phi: Vec<f32>,

    pub nx: usize,
    pub ny: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,

    pub phi_min: f32,
    pub phi_max: f32,

    /// 1-based count of completed sweeps.
    pub iterations: usize,

    /// Last sampled residual.
    pub residual: f64,
}

impl SolveResult {
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    pub fn phi_at(&self, i: usize, j: usize) -> f32 {
        self.phi[self.index(i, j)]
    }

    /// Potential along row `j` as `(world x, φ)` pairs.
    pub fn row(&self, j: usize) -> impl Iterator<Item = (f64, f32)> + '_ {
        let dx = (self.x_max - self.x_min) / (self.nx - 1) as f64;
        (0..self.nx).map(move |i| (self.x_min + i as f64 * dx, self.phi_at(i, j)))
    }

    /// Potential along column `i` as `(world y, φ)` pairs.
    pub fn column(&self, i: usize) -> impl Iterator<Item = (f64, f32)> + '_ {
        let dy = (self.y_max - self.y_min) / (self.ny - 1) as f64;
        (0..self.ny).map(move |j| (self.y_min + j as f64 * dy, self.phi_at(i, j)))
    }
}

/// SOR solver front end, generic over the sweep backend.
#[derive(Clone, Copy, Debug)]
pub struct SorSolver<Threading = SingleThreaded> {
    /// Whether to use single-threading or multi-threading
    pub threading: Threading,
}

impl Default for SorSolver<SingleThreaded> {
    fn default() -> Self {
        Self::single_threaded()
    }
}

impl SorSolver<SingleThreaded> {
    pub fn single_threaded() -> Self {
        Self {
            threading: SingleThreaded,
        }
    }
}

#[cfg(feature = "rayon")]
impl SorSolver<crate::sor::sweep::MultiThreaded> {
    pub fn multi_threaded(num_threads: Option<usize>) -> Result<Self, rayon::ThreadPoolBuildError> {
        use crate::sor::sweep::MultiThreaded;

        let threading = if let Some(num_threads) = num_threads {
            MultiThreaded::from_num_threads(num_threads)?
        }
        else {
            MultiThreaded::from_default_thread_pool()
        };

        Ok(Self { threading })
    }
}

impl<Threading> SorSolver<Threading> {
    pub fn new(threading: Threading) -> Self {
        Self { threading }
    }

    /// Peak working set of a solve: φ and ρ plus the packed mask.
    pub fn memory_required(&self, spec: &GridSpec) -> usize {
        let num_nodes = crate::grid::clamped_num_nodes(spec);
        num_nodes * (2 * size_of::<f32>() + size_of::<Option<f32>>())
    }
}

impl<Threading> SorSolver<Threading>
where
    Threading: Sweep,
{
    pub fn solve(
        &self,
        scene: &Scene,
        grid_spec: &GridSpec,
        config: &SorConfig,
    ) -> Result<SolveResult, SolveError> {
        self.solve_inner(scene, grid_spec, config, None)
    }

    /// Like [`solve`](Self::solve), but appends every sampled residual
    /// to `history` in order.
    pub fn solve_with_history(
        &self,
        scene: &Scene,
        grid_spec: &GridSpec,
        config: &SorConfig,
        history: &mut Vec<f64>,
    ) -> Result<SolveResult, SolveError> {
        self.solve_inner(scene, grid_spec, config, Some(history))
    }

    fn solve_inner(
        &self,
        scene: &Scene,
        grid_spec: &GridSpec,
        config: &SorConfig,
        mut history: Option<&mut Vec<f64>>,
    ) -> Result<SolveResult, SolveError> {
        scene.validate()?;
        let config = config.sanitized()?;
        let grid = Grid::new(&scene.domain, grid_spec)?;
        let epsilon = scene.domain.permittivity();

        tracing::debug!(
            nx = grid.nx(),
            ny = grid.ny(),
            charges = scene.charges.len(),
            conductors = scene.conductors.len(),
            "starting sor solve"
        );

        let rho = deposit_charges(&grid, &scene.charges, config.charge_sigma_cells);
        let mask = DirichletMask::build(&grid, &scene.conductors);

        // cold start, except that masked cells hold their fixed value
        // from the beginning
        let mut phi = Lattice::from_fn(&grid, |index, _| mask.fixed(index).unwrap_or(0.0));

        let stencil = Stencil::new(&grid, epsilon, config.omega);

        let mut iterations = 0;
        let mut residual = 0.0;

        for it in 0..config.max_iters {
            apply_neumann_boundary(&grid, phi.as_mut_slice());
            self.threading.sweep(&grid, &stencil, &mut phi, &rho, &mask);
            iterations = it + 1;

            if it % RESIDUAL_SAMPLE_INTERVAL == 0 || it + 1 == config.max_iters {
                residual = self.threading.residual(&grid, &stencil, &phi, &rho, &mask);
                if let Some(history) = history.as_deref_mut() {
                    history.push(residual);
                }
                if residual < config.tolerance {
                    break;
                }
            }
        }

        apply_neumann_boundary(&grid, phi.as_mut_slice());

        tracing::debug!(iterations, residual, "sor solve finished");

        let phi = phi.into_vec();
        let (phi_min, phi_max) = sanitized_range(&phi);

        Ok(SolveResult {
            phi,
            nx: grid.nx(),
            ny: grid.ny(),
            x_min: scene.domain.x_min,
            x_max: scene.domain.x_max,
            y_min: scene.domain.y_min,
            y_max: scene.domain.y_max,
            phi_min,
            phi_max,
            iterations,
            residual,
        })
    }
}

/// Extrema over all cells, sanitized so a renderer always gets a
/// usable range: non-finite collapses to [−1, 1] and a flat field gets
/// a 1e-6 spread.
fn sanitized_range(phi: &[f32]) -> (f32, f32) {
    if phi.iter().any(|value| !value.is_finite()) {
        return (-1.0, 1.0);
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &value in phi {
        min = min.min(value);
        max = max.max(value);
    }

    if f64::from(max) - f64::from(min) < 1e-12 {
        max = min + 1e-6;
    }

    (min, max)
}
