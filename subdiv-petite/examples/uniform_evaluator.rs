//! Refines a cube and prints the refined quads and positions.
//!
//! ```text
//! RUST_LOG=debug cargo run --example uniform_evaluator -- [threads] [levels]
//! ```
use anyhow::Context;
use subdiv_petite::osdutil::{SubdivTopology, TracingSink, UniformEvaluator, DEFAULT_MAX_LEVELS};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let thread_count = match args.next() {
        Some(arg) => arg.parse().context("threads must be a number")?,
        None => 4,
    };
    let max_levels = match args.next() {
        Some(arg) => arg.parse().context("levels must be a number")?,
        None => DEFAULT_MAX_LEVELS,
    };

    // Geometry for a cube control polyhedron.
    let vertices = [
        -0.5, -0.5, 0.5, 0.5, -0.5, 0.5, -0.5, 0.5, 0.5, 0.5, 0.5, 0.5, -0.5, 0.5, -0.5, 0.5, 0.5,
        -0.5, -0.5, -0.5, -0.5, 0.5, -0.5, -0.5,
    ];

    let topology = SubdivTopology::new(
        vertices.len() / 3,
        vec![4; 6],
        vec![
            0, 1, 3, 2, 2, 3, 5, 4, 4, 5, 7, 6, 6, 7, 1, 0, 1, 7, 5, 3, 6, 0, 2, 4,
        ],
    )
    .with_max_levels(max_levels);

    let mut evaluator = UniformEvaluator::new().with_error_sink(TracingSink);
    evaluator
        .initialize(&topology)
        .context("initialize failed")?;
    evaluator
        .set_coarse_positions(&vertices)
        .context("set_coarse_positions failed")?;
    evaluator
        .refine(thread_count)
        .context("refine failed")?;

    let quads = evaluator.refined_quads()?;
    println!("Quads = {}", quads.len());
    for [a, b, c, d] in quads {
        println!("({}, {}, {}, {})", a, b, c, d);
    }

    let (positions, len) = evaluator.refined_positions()?;
    println!("Positions = {}", len / 3);
    for [x, y, z] in positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]) {
        println!("({}, {}, {})", x, y, z);
    }

    Ok(())
}
