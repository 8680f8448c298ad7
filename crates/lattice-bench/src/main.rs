use std::path::PathBuf;
use std::process;

use lattice_bench::report;
use lattice_bench::runner::BenchmarkRunner;
use lattice_bench::scenes;
use lattice_world::config::WorldConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut iterations = 60u32;
    let mut use_gpu = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--baseline" => {
                i += 1;
                baseline_path = Some(PathBuf::from(value(&args, i)));
            }
            "--output" => {
                i += 1;
                output_path = Some(PathBuf::from(value(&args, i)));
            }
            "--world-config" => {
                i += 1;
                config_path = Some(PathBuf::from(value(&args, i)));
            }
            "--regression-threshold" => {
                i += 1;
                regression_threshold = parse(&args, i, "--regression-threshold");
            }
            "--iterations" => {
                i += 1;
                iterations = parse(&args, i, "--iterations");
            }
            "--gpu" => use_gpu = true,
            "--help" | "-h" => {
                eprintln!("Usage: bench-runner [OPTIONS]");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!("  --world-config <path>          World settings (RON)");
                eprintln!(
                    "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
                );
                eprintln!("  --iterations <n>               Iterations per scene (default: 60)");
                eprintln!("  --gpu                          Upload through a wgpu device");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let world_config = match config_path {
        Some(path) => {
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| WorldConfig::from_ron(&s).map_err(|e| e.to_string()));
            match loaded {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Invalid world config {}: {}", path.display(), e);
                    process::exit(1);
                }
            }
        }
        None => WorldConfig::default(),
    };

    let mut runner = if use_gpu {
        log::info!("Initializing GPU...");
        match BenchmarkRunner::gpu(iterations, world_config) {
            Ok(runner) => runner,
            Err(e) => {
                eprintln!("GPU initialization failed: {}", e);
                process::exit(1);
            }
        }
    } else {
        BenchmarkRunner::headless(iterations, world_config)
    };

    let mut results = Vec::new();
    for config in &scenes::standard_scenes() {
        match runner.run_scene(config) {
            Ok(result) => results.push(result),
            Err(e) => {
                eprintln!("Scene '{}' failed: {}", config.name, e);
                process::exit(1);
            }
        }
    }

    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: format!("bench-{}", process::id()),
            results: results.clone(),
        };
        if let Err(e) = report::save_baseline(path, &baseline) {
            eprintln!("Failed to save baseline {}: {}", path.display(), e);
            process::exit(1);
        }
        log::info!("Saved baseline to {}", path.display());
    }

    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                eprintln!(
                    "ERROR: {} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

fn value(args: &[String], i: usize) -> &str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("Missing value for {}", args[i - 1]);
            process::exit(1);
        }
    }
}

fn parse<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match value(args, i).parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Invalid {} value: {}", flag, args[i]);
            process::exit(1);
        }
    }
}
