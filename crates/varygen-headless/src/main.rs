use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Instant;
use varygen_core::data::{create_default_data_files, DataLoader};
use varygen_core::economy::{audit, EconomySnapshot, StateReport};
use varygen_core::scenario::Scenario;
use varygen_core::{EconomyConfig, GameTick, SimulationApp};

#[derive(Parser)]
#[command(name = "varygen-headless")]
#[command(about = "Varygen headless business simulation runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario for a number of ticks
    Run {
        /// Scenario file to load (or 'demo' for the built-in one)
        #[arg(long, default_value = "demo")]
        scenario: String,

        /// Number of ticks to run
        #[arg(long, default_value = "600")]
        ticks: u64,

        /// Target TPS (ticks per second)
        #[arg(long, default_value = "60")]
        tps: u32,

        /// Data directory holding economy.toml
        #[arg(long, default_value = "assets/data")]
        config: String,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Apply a scenario and print the resulting state as JSON
    Report {
        /// Scenario file to load (or 'demo' for the built-in one)
        #[arg(long, default_value = "demo")]
        scenario: String,

        /// Data directory holding economy.toml
        #[arg(long, default_value = "assets/data")]
        config: String,
    },

    /// Validate economy data files
    ValidateConfig {
        /// Data directory to validate
        #[arg(long, default_value = "assets/data")]
        config: String,
    },

    /// Write default data files
    InitData {
        /// Output directory
        #[arg(long, default_value = "assets/data")]
        dir: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run {
            scenario,
            ticks,
            tps,
            config,
            verbose,
        } => {
            init_logging(*verbose);
            run_simulation(scenario, *ticks, *tps, config)
        }
        Commands::Report { scenario, config } => {
            init_logging(false);
            print_report(scenario, config)
        }
        Commands::ValidateConfig { config } => {
            init_logging(true);
            validate_config(config)
        }
        Commands::InitData { dir } => {
            init_logging(false);
            create_default_data_files(dir)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn load_scenario(name: &str) -> Result<Scenario> {
    if name == "demo" {
        Ok(Scenario::demo())
    } else {
        Scenario::load(name)
    }
}

fn run_simulation(scenario_name: &str, ticks: u64, tps: u32, data_dir: &str) -> Result<()> {
    log::info!(
        "Starting simulation: scenario={}, ticks={}, tps={}",
        scenario_name,
        ticks,
        tps
    );

    let config = DataLoader::load_from_directory(data_dir)?;
    let scenario = load_scenario(scenario_name)?;

    let mut sim = SimulationApp::with_config(config);
    if let Some(mut tick_resource) = sim.get_resource_mut::<GameTick>() {
        tick_resource.target_tps = tps;
    }

    let before = EconomySnapshot::capture(sim.manager());
    let report = sim.load_scenario(&scenario)?;
    log::info!(
        "Seeded {} businesses: {} contracts settled, {} rejected; {} conflicts opened, {} resolved",
        report.businesses_created,
        report.contracts_settled,
        report.contracts_rejected,
        report.conflicts_opened,
        report.conflicts_resolved
    );

    let start_time = Instant::now();
    let target_tick_duration = std::time::Duration::from_secs_f32(1.0 / tps.max(1) as f32);

    for tick in 0..ticks {
        let tick_start = Instant::now();

        sim.tick();

        if tick % (tps.max(1) as u64 * 5) == 0 {
            let progress = (tick as f32 / ticks as f32) * 100.0;
            log::info!(
                "Progress: {:.1}% ({}/{}) - {:.1}s elapsed",
                progress,
                tick,
                ticks,
                start_time.elapsed().as_secs_f32()
            );
        }

        let tick_duration = tick_start.elapsed();
        if tick_duration < target_tick_duration {
            std::thread::sleep(target_tick_duration - tick_duration);
        }
    }

    log::info!(
        "Simulation completed in {:.2}s",
        start_time.elapsed().as_secs_f32()
    );

    let manager = sim.manager();
    for business in manager.businesses() {
        log::info!(
            "  {} ({}, owner {}): ${:.2}, {} resource lines, {} contracts, {} conflicts",
            business.name(),
            business.business_type(),
            business.owner(),
            business.money(),
            business.resources().count(),
            business.contract_ids().len(),
            business.conflict_ids().len()
        );
    }

    let after = EconomySnapshot::capture(manager);
    log::info!(
        "Money in circulation: ${:.2} (start ${:.2}), {} open conflicts",
        after.total_money,
        before.total_money,
        after.open_conflicts
    );

    let violations = audit(manager);
    if violations.is_empty() {
        log::info!("✓ Economy invariants hold");
    } else {
        for violation in &violations {
            log::error!("✗ {}", violation);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(scenario_name: &str, data_dir: &str) -> Result<()> {
    let config = DataLoader::load_from_directory(data_dir)?;
    let scenario = load_scenario(scenario_name)?;

    let mut sim = SimulationApp::with_config(config);
    sim.load_scenario(&scenario)?;

    let json = StateReport::new(sim.manager()).to_json_pretty()?;
    println!("{}", json);
    Ok(())
}

fn validate_config(data_dir: &str) -> Result<()> {
    log::info!("Validating data files in {}", data_dir);

    match DataLoader::load_from_directory(data_dir) {
        Ok(config) => {
            let defaults = EconomyConfig::default();
            log::info!("✓ Data validation passed");
            log::info!(
                "  Starting money: ${:.2}{}",
                config.starting_money,
                if config.starting_money == defaults.starting_money {
                    " (default)"
                } else {
                    ""
                }
            );
            log::info!(
                "  Mediation fee band: ${:.2} - ${:.2}",
                config.mediation_fee_min,
                config.mediation_fee_max
            );
        }
        Err(e) => {
            log::error!("✗ Data validation failed: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
