//! ZooLaunch CLI - Launch Configurator for Distributed ImageNet Training
//!
//! Configures the process environment and spark-submit arguments, then
//! hands control to the external launcher.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zoolaunch::config::{CliArgs, Commands, DataMode, LaunchConfig, ProfileSet};
use zoolaunch::error::Result;
use zoolaunch::launch::{exit_code_for, Launcher};
use zoolaunch::system::SystemInfo;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging; --quiet limits it to errors
    let filter = match args.log_filter() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Subcommands inspect configuration; the default action launches.
    if let Some(command) = args.command.clone() {
        if let Err(e) = handle_command(&command, &args) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let result = launch(&args);
    if let Err(ref e) = result {
        eprintln!("Error: {}", e);
    }
    std::process::exit(exit_code_for(&result));
}

fn launch(args: &CliArgs) -> Result<i32> {
    let config = LaunchConfig::from_cli(args)?;

    if args.effective_verbose() > 0 {
        print_config(&config);
    }

    let launcher = Launcher::new(config);

    if launcher.config().dry_run {
        print_plan(&launcher)?;
        return Ok(0);
    }

    launcher.run()
}

fn handle_command(command: &Commands, args: &CliArgs) -> Result<()> {
    match command {
        Commands::Plan { json } => cmd_plan(args, *json),
        Commands::Env => cmd_env(args),
        Commands::Profiles => cmd_profiles(args),
        Commands::Analyze { detailed } => cmd_analyze(args, *detailed),
    }
}

fn cmd_plan(args: &CliArgs, json: bool) -> Result<()> {
    let config = LaunchConfig::from_cli(args)?;
    let launcher = Launcher::new(config);

    if json {
        let env = launcher.environment()?;
        let submit = launcher.submit_args();
        let config = launcher.config();

        let environment: serde_json::Map<String, serde_json::Value> = env
            .entries()
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        let argv = submit.argv();
        let plan = serde_json::json!({
            "profile": config.profile.name.clone(),
            "seed": config.seed,
            "launcher": config.launcher.display().to_string(),
            "environment": environment,
            "submit": submit,
            "argv": argv,
        });
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&launcher)?;
    }

    Ok(())
}

fn cmd_env(args: &CliArgs) -> Result<()> {
    let config = LaunchConfig::from_cli(args)?;
    let launcher = Launcher::new(config);
    print!("{}", launcher.environment()?.render_exports());
    Ok(())
}

fn cmd_profiles(args: &CliArgs) -> Result<()> {
    let mut profiles = ProfileSet::builtin();
    if let Some(ref path) = args.profile_file {
        profiles.merge_file(path)?;
    }

    println!("Known deployment profiles:\n");
    for profile in profiles.profiles() {
        let data = match &profile.data {
            DataMode::Synthetic => "synthetic data".to_string(),
            DataMode::Real {
                data_dir,
                train_epochs,
            } => format!("{} ({} epochs)", data_dir.display(), train_epochs),
        };

        println!("  {}", profile.name);
        println!("    {}", profile.description);
        println!(
            "    master {} | {} cores | driver {} | executor {}",
            profile.master,
            profile.total_executor_cores,
            profile.driver_memory,
            profile.executor_memory
        );
        println!(
            "    OMP {} threads | KMP_AFFINITY {} | {}",
            profile.omp_threads,
            profile.affinity.render(),
            data
        );
        println!();
    }

    Ok(())
}

fn cmd_analyze(args: &CliArgs, detailed: bool) -> Result<()> {
    let info = SystemInfo::collect();
    info.print_summary(detailed);

    let mut profiles = ProfileSet::builtin();
    if let Some(ref path) = args.profile_file {
        profiles.merge_file(path)?;
    }

    if let Some(profile) = info.recommend_profile(profiles.profiles()) {
        println!();
        println!("Recommended profile: {}", profile.name);
        println!("  {}", profile.description);
    }

    Ok(())
}

fn print_plan(launcher: &Launcher) -> Result<()> {
    let env = launcher.environment()?;
    let submit = launcher.submit_args();
    let config = launcher.config();

    println!("=== Launch Plan ({}) ===", config.profile.name);
    println!();
    print!("{}", env.render_exports());
    println!();
    print!(
        "{}",
        submit.render(&config.launcher.display().to_string())
    );
    Ok(())
}

fn print_config(config: &LaunchConfig) {
    println!("=== Configuration ===");
    println!("Profile:     {}", config.profile.name);
    println!("Master:      {}", config.profile.master);
    println!("Seed:        {}", config.seed);
    println!("Model dir:   {:?}", config.model_dir);
    println!("Batch size:  {}", config.profile.batch_size);
    println!("ResNet:      v{} size {}", config.profile.model_version, config.profile.resnet_size);
    println!("Quality:     {}", config.profile.stop_threshold);
    println!("OMP threads: {}", config.omp_threads());
    println!("Affinity:    {}", config.profile.affinity.render());
    println!("Launcher:    {:?}", config.launcher);

    match &config.profile.data {
        DataMode::Synthetic => println!("Data:        synthetic"),
        DataMode::Real {
            data_dir,
            train_epochs,
        } => {
            println!("Data:        {:?} ({} epochs)", data_dir, train_epochs);
        }
    }

    println!();
}
