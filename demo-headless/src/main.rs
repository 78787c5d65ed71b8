use aero_flow_core::{
    AeroModel, FlowConfig, FlowFrame, FlowSimulation, FlowStyle, Metric, RenderSink,
    TelemetryLog, ZoneType,
};
use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Headless car aerodynamics flow demo
#[derive(Parser, Debug)]
#[command(name = "aero-flow-demo")]
#[command(about = "Streamline flow simulation around a race car", long_about = None)]
struct Args {
    /// Number of ticks to run
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// Fixed time step in seconds
    #[arg(long, default_value_t = 0.016)]
    dt: f32,

    /// RNG seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Total element slots
    #[arg(short, long, default_value_t = 600)]
    budget: usize,

    /// Render single-point particles instead of streamlines
    #[arg(short, long)]
    particles: bool,

    /// JSON `FlowConfig` file; overrides budget, style and seed
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Car speed in km/h
    #[arg(long, default_value_t = 400.0)]
    speed: f32,

    /// Car travel per second along the z axis (metres)
    #[arg(long, default_value_t = 0.0)]
    car_velocity: f32,

    /// Toggle DRS every N seconds (0 = never)
    #[arg(long, default_value_t = 0.0)]
    drs_interval: f32,

    /// Front ride height in metres, used for telemetry
    #[arg(long, default_value_t = 0.05)]
    front_ride_height: f32,

    /// Rear ride height in metres, used for telemetry
    #[arg(long, default_value_t = 0.08)]
    rear_ride_height: f32,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 1.0)]
    report_interval: f32,
}

/// Records the shape of every submitted frame.
#[derive(Default)]
struct StatsSink {
    frames: usize,
    last_points: usize,
    last_vortex_points: usize,
}

impl RenderSink for StatsSink {
    fn submit(&mut self, frame: &FlowFrame) {
        self.frames += 1;
        self.last_points = frame.point_count();
        self.last_vortex_points = frame
            .segments()
            .iter()
            .filter(|segment| segment.is_vortex)
            .map(|segment| segment.len)
            .sum();
    }
}

fn load_config(args: &Args) -> Result<FlowConfig, Box<dyn Error>> {
    if let Some(path) = &args.config {
        let text = fs::read_to_string(path)?;
        let config: FlowConfig = serde_json::from_str(&text)?;
        info!(path = %path.display(), "Loaded flow config");
        return Ok(config);
    }

    let mut config = FlowConfig {
        line_budget: args.budget,
        seed: args.seed,
        ..FlowConfig::default()
    };
    if args.particles {
        config.style = FlowStyle::Particles;
    }
    config.controls.car_speed = args.speed;
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    println!("=== Aero Flow Demo ===\n");
    let mut sim = FlowSimulation::new(config)?;
    let stats = sim.stats();
    println!(
        "Seeded {} of {} elements ({} vortex, {} skipped)",
        stats.elements, stats.capacity, stats.vortices, stats.skipped_seeds
    );
    for zone in ZoneType::ALL {
        println!("  {:<12} {:5}", zone.name(), stats.count(zone));
    }

    let model = AeroModel::default();
    let mut telemetry = TelemetryLog::default();
    let mut sink = StatsSink::default();
    let mut next_report = 0.0;
    let mut next_drs = args.drs_interval;

    println!("\nTime(s) | Points | Vortex pts | Reseeded | Downforce(kgf) | Drag(kgf) | DRS");
    println!("--------|--------|------------|----------|----------------|-----------|----");

    for _ in 0..args.ticks {
        let position = sim.controls().car_position + args.car_velocity * args.dt;
        sim.set_car_position(position);

        if args.drs_interval > 0.0 && sim.elapsed() >= next_drs {
            let open = !sim.controls().drs_open;
            sim.set_drs(open);
            next_drs += args.drs_interval;
        }

        let tick = sim.tick(args.dt);
        sim.render(&mut sink);

        let controls = sim.controls();
        telemetry.push(model.sample(
            controls.car_speed,
            controls.drs_open,
            args.front_ride_height,
            args.rear_ride_height,
            sim.elapsed(),
        ));

        if sim.elapsed() >= next_report {
            if let Some(sample) = telemetry.latest() {
                println!(
                    "{:7.2} | {:6} | {:10} | {:8} | {:14.1} | {:9.1} | {}",
                    sample.time,
                    sink.last_points,
                    sink.last_vortex_points,
                    tick.reseeded,
                    sample.downforce,
                    sample.drag,
                    if sample.drs_active { "open" } else { "shut" }
                );
            }
            next_report += args.report_interval;
        }
    }

    println!("\n=== Run Complete ===");
    println!("Ticks: {}  Frames rendered: {}", sim.tick_count(), sink.frames);
    println!("Simulated time: {:.2}s", sim.elapsed());

    let window = args.report_interval.max(1.0) * 5.0;
    println!("\nTelemetry over the last {window:.1}s:");
    for metric in Metric::ALL {
        let series = telemetry.series(metric, window);
        if series.is_empty() {
            continue;
        }
        let mean = series.iter().map(|(_, v)| v).sum::<f32>() / series.len() as f32;
        let latest = telemetry.latest().map_or(0.0, |sample| metric.value(sample));
        println!("  {:<16} latest {:8.2}  normalised mean {:.3}", metric.name(), latest, mean);
    }

    Ok(())
}
