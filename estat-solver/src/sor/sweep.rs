use crate::{
    grid::Grid,
    lattice::Lattice,
    mask::DirichletMask,
};

/// Precomputed 5-point stencil factors for one solve.
///
/// The Gauss-Seidel update solves the discrete −∇²φ = ρ/ε for the
/// center value: φ* = [(φ_E + φ_W)/dx² + (φ_N + φ_S)/dy² + ρ/ε] / D
/// with D = 2·(1/dx² + 1/dy²), then relaxes φ ← φ + ω·(φ* − φ).
#[derive(Clone, Copy, Debug)]
pub struct Stencil {
    pub inv_dx2: f64,
    pub inv_dy2: f64,
    pub inv_diag: f64,
    pub omega: f64,
    pub inv_epsilon: f64,
}

impl Stencil {
    pub fn new(grid: &Grid, epsilon: f64, omega: f64) -> Self {
        let inv_dx2 = 1.0 / (grid.dx() * grid.dx());
        let inv_dy2 = 1.0 / (grid.dy() * grid.dy());

        Self {
            inv_dx2,
            inv_dy2,
            inv_diag: 1.0 / (2.0 * (inv_dx2 + inv_dy2)),
            omega,
            inv_epsilon: 1.0 / epsilon,
        }
    }
}

/// Defines how a backend orders and parallelizes the interior update
/// sweep and the residual reduction.
///
/// [`SingleThreaded`] is the reference semantics: lexicographic
/// Gauss-Seidel, fully coupled updates. [`MultiThreaded`] trades that
/// for a red-black ordering whose half sweeps parallelize across rows;
/// its convergence curve differs slightly but the converged field
/// agrees within tolerance.
pub trait Sweep: Send + Sync + 'static {
    fn sweep(
        &self,
        grid: &Grid,
        stencil: &Stencil,
        phi: &mut Lattice<f32>,
        rho: &Lattice<f32>,
        mask: &DirichletMask,
    );

    fn residual(
        &self,
        grid: &Grid,
        stencil: &Stencil,
        phi: &Lattice<f32>,
        rho: &Lattice<f32>,
        mask: &DirichletMask,
    ) -> f64;
}

/// Use single-threading
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleThreaded;

impl Sweep for SingleThreaded {
    fn sweep(
        &self,
        grid: &Grid,
        stencil: &Stencil,
        phi: &mut Lattice<f32>,
        rho: &Lattice<f32>,
        mask: &DirichletMask,
    ) {
        let nx = grid.nx();
        let phi = phi.as_mut_slice();
        let rho = rho.as_slice();

        for j in 1..grid.ny() - 1 {
            let row = j * nx;
            for i in 1..nx - 1 {
                let k = row + i;
                if mask.is_masked(k) {
                    continue;
                }
                relax(k, nx, stencil, phi, rho);
            }
        }
    }

    fn residual(
        &self,
        grid: &Grid,
        stencil: &Stencil,
        phi: &Lattice<f32>,
        rho: &Lattice<f32>,
        mask: &DirichletMask,
    ) -> f64 {
        let mut sum = 0.0;
        let mut count = 0;

        for j in 1..grid.ny() - 1 {
            let (row_sum, row_count) =
                residual_row(j, grid, stencil, phi.as_slice(), rho.as_slice(), mask);
            sum += row_sum;
            count += row_count;
        }

        residual_norm(sum, count)
    }
}

#[inline]
fn relax(k: usize, nx: usize, stencil: &Stencil, phi: &mut [f32], rho: &[f32]) {
    let east = f64::from(phi[k + 1]);
    let west = f64::from(phi[k - 1]);
    let north = f64::from(phi[k + nx]);
    let south = f64::from(phi[k - nx]);
    let old = f64::from(phi[k]);

    let star = ((east + west) * stencil.inv_dx2
        + (north + south) * stencil.inv_dy2
        + f64::from(rho[k]) * stencil.inv_epsilon)
        * stencil.inv_diag;

    phi[k] = (old + stencil.omega * (star - old)) as f32;
}

/// Squared-residual sum and sample count for one interior row,
/// skipping masked cells.
fn residual_row(
    j: usize,
    grid: &Grid,
    stencil: &Stencil,
    phi: &[f32],
    rho: &[f32],
    mask: &DirichletMask,
) -> (f64, usize) {
    let nx = grid.nx();
    let row = j * nx;

    let mut sum = 0.0;
    let mut count = 0;

    for i in 1..nx - 1 {
        let k = row + i;
        if mask.is_masked(k) {
            continue;
        }

        let center = f64::from(phi[k]);
        let laplacian = (f64::from(phi[k + 1]) - 2.0 * center + f64::from(phi[k - 1]))
            * stencil.inv_dx2
            + (f64::from(phi[k + nx]) - 2.0 * center + f64::from(phi[k - nx])) * stencil.inv_dy2;
        let r = -laplacian - f64::from(rho[k]) * stencil.inv_epsilon;

        sum += r * r;
        count += 1;
    }

    (sum, count)
}

fn residual_norm(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    }
    else {
        (sum / count as f64).sqrt()
    }
}

/// Copy-neighbor enforcement of ∂φ/∂n = 0 on the outer ring.
///
/// The left/right columns are copied first and the bottom/top rows
/// last, so corner cells take their row assignment.
pub fn apply_neumann_boundary(grid: &Grid, phi: &mut [f32]) {
    let nx = grid.nx();
    let ny = grid.ny();

    for j in 0..ny {
        let row = j * nx;
        phi[row] = phi[row + 1];
        phi[row + nx - 1] = phi[row + nx - 2];
    }

    for i in 0..nx {
        phi[i] = phi[nx + i];
        phi[(ny - 1) * nx + i] = phi[(ny - 2) * nx + i];
    }
}

/// Use multi-threading
#[cfg(feature = "rayon")]
#[derive(Clone, Debug)]
pub struct MultiThreaded {
    thread_pool: Option<std::sync::Arc<rayon::ThreadPool>>,
}

#[cfg(feature = "rayon")]
impl MultiThreaded {
    /// Use default number of threads (see [`rayon::current_num_threads`])
    pub fn from_default_thread_pool() -> Self {
        Self { thread_pool: None }
    }

    pub fn from_num_threads(num_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        Ok(Self::from_thread_pool(
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()?,
        ))
    }

    pub fn from_thread_pool(thread_pool: rayon::ThreadPool) -> Self {
        Self {
            thread_pool: Some(std::sync::Arc::new(thread_pool)),
        }
    }

    fn install<R>(&self, f: impl FnOnce() -> R + Send) -> R
    where
        R: Send,
    {
        if let Some(thread_pool) = &self.thread_pool {
            thread_pool.install(f)
        }
        else {
            f()
        }
    }
}

#[cfg(feature = "rayon")]
impl Default for MultiThreaded {
    fn default() -> Self {
        Self::from_default_thread_pool()
    }
}

#[cfg(feature = "rayon")]
impl Sweep for MultiThreaded {
    fn sweep(
        &self,
        grid: &Grid,
        stencil: &Stencil,
        phi: &mut Lattice<f32>,
        rho: &Lattice<f32>,
        mask: &DirichletMask,
    ) {
        let cells = shared::as_cells(phi.as_mut_slice());

        self.install(|| {
            // red cells only read black neighbors and vice versa, so
            // each half sweep is data-race free across rows
            shared::half_sweep(grid, stencil, cells, rho.as_slice(), mask, 0);
            shared::half_sweep(grid, stencil, cells, rho.as_slice(), mask, 1);
        });
    }

    fn residual(
        &self,
        grid: &Grid,
        stencil: &Stencil,
        phi: &Lattice<f32>,
        rho: &Lattice<f32>,
        mask: &DirichletMask,
    ) -> f64 {
        use rayon::iter::{
            IntoParallelIterator,
            ParallelIterator,
        };

        let (sum, count) = self.install(|| {
            (1..grid.ny() - 1)
                .into_par_iter()
                .map(|j| residual_row(j, grid, stencil, phi.as_slice(), rho.as_slice(), mask))
                .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
        });

        residual_norm(sum, count)
    }
}

#[cfg(feature = "rayon")]
mod shared {
    use std::cell::UnsafeCell;

    use rayon::iter::{
        IntoParallelIterator,
        ParallelIterator,
    };

    use crate::{
        grid::Grid,
        mask::DirichletMask,
        sor::sweep::Stencil,
    };

    #[repr(transparent)]
    pub struct SharedCell(UnsafeCell<f32>);

    // SAFETY: the red-black half sweeps write each cell from at most one
    // row task and never read a cell of the color being written.
    unsafe impl Sync for SharedCell {}

    pub fn as_cells(phi: &mut [f32]) -> &[SharedCell] {
        // SAFETY: SharedCell is a transparent wrapper around f32 and the
        // exclusive borrow guarantees no other access for its lifetime.
        unsafe { &*(phi as *mut [f32] as *const [SharedCell]) }
    }

    pub fn half_sweep(
        grid: &Grid,
        stencil: &Stencil,
        phi: &[SharedCell],
        rho: &[f32],
        mask: &DirichletMask,
        color: usize,
    ) {
        let nx = grid.nx();

        (1..grid.ny() - 1).into_par_iter().for_each(|j| {
            let row = j * nx;
            let first = if (1 + j) % 2 == color { 1 } else { 2 };

            let mut i = first;
            while i < nx - 1 {
                let k = row + i;
                if !mask.is_masked(k) {
                    let read = |index: usize| {
                        // SAFETY: neighbors of a `color` cell all have the
                        // opposite color; no thread writes them in this pass
                        f64::from(unsafe { *phi[index].0.get() })
                    };

                    let old = read(k);
                    let star = ((read(k + 1) + read(k - 1)) * stencil.inv_dx2
                        + (read(k + nx) + read(k - nx)) * stencil.inv_dy2
                        + f64::from(rho[k]) * stencil.inv_epsilon)
                        * stencil.inv_diag;

                    // SAFETY: `k` has color `color`; this task owns every
                    // `color` cell of row `j`
                    unsafe {
                        *phi[k].0.get() = (old + stencil.omega * (star - old)) as f32;
                    }
                }
                i += 2;
            }
        });
    }
}
