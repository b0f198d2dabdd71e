use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct SolveArgs {
    /// Scene file (.toml or .json); see `dump-default-scene` for the
    /// layout
    #[clap(short, long)]
    pub scene: Option<PathBuf>,

    /// Built-in demonstration scene; see `list-presets`
    #[clap(short, long, conflicts_with = "scene")]
    pub preset: Option<String>,

    /// Where to write the raw potential (little-endian float32,
    /// row-major, no header)
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Write a project snapshot (scene + settings + solution
    /// fingerprint) next to the run
    #[clap(long)]
    pub project: Option<PathBuf>,

    /// Write every sampled residual, one per line
    #[clap(long)]
    pub residual_log: Option<PathBuf>,

    /// Number of worker threads; omit for the single-threaded
    /// reference sweep
    #[clap(short = 'j', long)]
    pub num_threads: Option<usize>,

    /// Print the potential along one grid row
    #[clap(long, value_name = "J")]
    pub probe_row: Option<usize>,

    /// Print the potential along one grid column
    #[clap(long, value_name = "I")]
    pub probe_column: Option<usize>,

    #[clap(long)]
    pub nx: Option<usize>,

    #[clap(long)]
    pub ny: Option<usize>,

    #[clap(long)]
    pub max_iters: Option<usize>,

    #[clap(long)]
    pub tolerance: Option<f64>,

    #[clap(long)]
    pub omega: Option<f64>,

    /// Gaussian deposition width in cells
    #[clap(long)]
    pub charge_sigma_cells: Option<f64>,
}

impl SolveArgs {
    pub fn apply_overrides(&self, file: &mut crate::files::SceneFile) {
        if let Some(nx) = self.nx {
            file.grid.nx = nx;
        }
        if let Some(ny) = self.ny {
            file.grid.ny = ny;
        }
        if let Some(max_iters) = self.max_iters {
            file.solver.max_iters = max_iters;
        }
        if let Some(tolerance) = self.tolerance {
            file.solver.tolerance = tolerance;
        }
        if let Some(omega) = self.omega {
            file.solver.omega = omega;
        }
        if let Some(charge_sigma_cells) = self.charge_sigma_cells {
            file.solver.charge_sigma_cells = charge_sigma_cells;
        }
    }
}
