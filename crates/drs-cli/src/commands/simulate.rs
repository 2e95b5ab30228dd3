use anyhow::Result;
use drs_core::{ReviewSettings, Spin, Vector3};
use drs_simulator::{simulate, LaunchState};

pub fn simulate_launch(
    position: Vector3,
    velocity: Vector3,
    spin: Spin,
    plane_depth: f64,
    settings: &ReviewSettings,
) -> Result<()> {
    let launch = LaunchState {
        position,
        velocity,
        spin,
    };
    let trajectory = simulate(&launch, plane_depth, &settings.simulation);
    match trajectory.stump_plane_crossing() {
        Some(crossing) => tracing::info!(
            "Reaches z={:.2} at x={:.3}, y={:.3} after {:.2}s",
            plane_depth,
            crossing.x,
            crossing.y,
            trajectory.points.last().map_or(0.0, |p| p.time_offset)
        ),
        None => tracing::info!(
            "Does not reach z={:.2} within {} steps",
            plane_depth,
            settings.simulation.max_iterations
        ),
    }
    println!("{}", serde_json::to_string_pretty(&trajectory)?);
    Ok(())
}
