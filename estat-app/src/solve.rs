use std::{
    fmt::Write as _,
    fs::File,
    io::{
        BufWriter,
        Write as _,
    },
    time::Instant,
};

use color_eyre::eyre::{
    Error,
    bail,
};
use estat_solver::{
    SolveResult,
    SorSolver,
    Sweep,
};
use estat_util::{
    format_size,
    io::write_phi,
};

use crate::{
    args::SolveArgs,
    files::{
        self,
        SceneFile,
    },
    presets,
    project::{
        ProjectFileData,
        SolutionSnapshot,
    },
};

pub fn run_solve(args: SolveArgs) -> Result<(), Error> {
    let mut scene_file = if let Some(path) = &args.scene {
        files::load_scene_file(path)?
    }
    else if let Some(name) = &args.preset {
        match presets::preset(name) {
            Some(scene_file) => scene_file,
            None => bail!("unknown preset: {name}"),
        }
    }
    else {
        bail!("either --scene or --preset is required");
    };

    args.apply_overrides(&mut scene_file);
    scene_file.scene.validate()?;

    let memory_required = SorSolver::single_threaded().memory_required(&scene_file.grid);
    tracing::debug!(
        grid = ?(scene_file.grid.nx, scene_file.grid.ny),
        memory_required = %format_size(memory_required),
        "creating solve"
    );

    let time_start = Instant::now();
    let mut history = Vec::new();
    let result = run_with_backend(&args, &scene_file, &mut history)?;
    tracing::debug!("time to solve: {:?}", time_start.elapsed());

    let solution = SolutionSnapshot::from_result(&result);

    println!("iterations:  {}", result.iterations);
    println!("residual:    {:.3e}", result.residual);
    println!("phi range:   [{}, {}]", result.phi_min, result.phi_max);
    println!("fingerprint: {}", solution.phi_fingerprint);

    if let Some(output) = &args.output {
        let mut writer = BufWriter::new(File::create(output)?);
        write_phi(&mut writer, &result.phi)?;
        writer.flush()?;
        tracing::debug!(
            path = %output.display(),
            bytes = result.phi.len() * 4,
            "wrote potential dump"
        );
    }

    if let Some(path) = &args.residual_log {
        let mut contents = String::new();
        for residual in &history {
            writeln!(contents, "{residual:e}")?;
        }
        std::fs::write(path, contents)?;
    }

    if let Some(path) = &args.project {
        files::save_pretty(path, &ProjectFileData::new(&scene_file, Some(solution)))?;
        tracing::debug!(path = %path.display(), "wrote project snapshot");
    }

    if let Some(j) = args.probe_row {
        if j >= result.ny {
            bail!("probe row {j} is outside the grid (ny = {})", result.ny);
        }
        for (x, phi) in result.row(j) {
            println!("{x} {phi}");
        }
    }

    if let Some(i) = args.probe_column {
        if i >= result.nx {
            bail!("probe column {i} is outside the grid (nx = {})", result.nx);
        }
        for (y, phi) in result.column(i) {
            println!("{y} {phi}");
        }
    }

    Ok(())
}

fn run_with_backend(
    args: &SolveArgs,
    scene_file: &SceneFile,
    history: &mut Vec<f64>,
) -> Result<SolveResult, Error> {
    match args.num_threads {
        None => solve_with(&SorSolver::single_threaded(), scene_file, history),
        Some(num_threads) if num_threads <= 1 => {
            tracing::debug!(
                num_threads,
                "switching to single-threaded backend, because num_threads <= 1"
            );
            solve_with(&SorSolver::single_threaded(), scene_file, history)
        }
        Some(num_threads) => {
            #[cfg(not(feature = "multi-threading"))]
            {
                let _ = num_threads;
                tracing::warn!("Compiled without rayon feature. Falling back to single-threaded");
                solve_with(&SorSolver::single_threaded(), scene_file, history)
            }

            #[cfg(feature = "multi-threading")]
            {
                tracing::debug!(num_threads, "using multi-threaded backend");
                solve_with(
                    &SorSolver::multi_threaded(Some(num_threads))?,
                    scene_file,
                    history,
                )
            }
        }
    }
}

fn solve_with<Threading>(
    solver: &SorSolver<Threading>,
    scene_file: &SceneFile,
    history: &mut Vec<f64>,
) -> Result<SolveResult, Error>
where
    Threading: Sweep,
{
    let result = solver.solve_with_history(
        &scene_file.scene,
        &scene_file.grid,
        &scene_file.solver,
        history,
    )?;

    Ok(result)
}
