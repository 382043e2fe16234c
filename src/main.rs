use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use flowsim::catalog::{is_custom_id, WorkflowDefinition, WorkflowLoader};
use flowsim::run::{
    FailurePolicy, LogLevel, NeverFail, RandomFailure, RunMachine, RunMode, Speed, SystemClock,
};
use flowsim::store::{FileBackend, Store, Theme};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory for persisted state
    #[arg(long, default_value = ".flowsim")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in and custom workflows
    List,
    /// Play a workflow back to completion
    Run {
        /// Workflow id
        #[arg(short, long)]
        workflow: String,

        /// Playback speed (defaults to the persisted setting)
        #[arg(short, long)]
        speed: Option<Speed>,

        /// Per-step failure probability; enables failure simulation
        #[arg(long)]
        failure_rate: Option<f64>,
    },
    /// Print cumulative run statistics
    Stats,
    /// Print the analytics CSV export
    ExportCsv {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export custom workflows, analytics, and theme to a JSON document
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge a previously exported document into this install
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Save a custom workflow from a YAML definition
    Save {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a custom workflow
    Delete {
        #[arg(short, long)]
        id: String,
    },
    /// Reset analytics to zero
    ClearStats,
    /// Show or set the theme
    Theme { value: Option<Theme> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let store = Arc::new(Store::with_system_clock(FileBackend::new(&args.data_dir)));

    match args.command {
        Commands::List => {
            for wf in store.all_workflows() {
                let kind = if wf.is_custom() { "custom" } else { "built-in" };
                println!(
                    "{:<24} {:<32} {:>2} steps  [{}]",
                    wf.id,
                    wf.name,
                    wf.steps.len(),
                    kind
                );
            }
        }

        Commands::Run {
            workflow,
            speed,
            failure_rate,
        } => {
            let definition = store
                .find_workflow(&workflow)
                .with_context(|| format!("Unknown workflow id: {}", workflow))?;

            if failure_rate.is_some() {
                let mut settings = store.settings();
                settings.enable_step_failure = true;
                store.save_settings(&settings)?;
            }
            let policy: Arc<dyn FailurePolicy> = match failure_rate {
                Some(p) => Arc::new(RandomFailure::new(p)),
                None => Arc::new(NeverFail),
            };

            let machine =
                RunMachine::with_components(store.clone(), Arc::new(SystemClock), policy);
            if let Some(speed) = speed {
                machine.set_speed(speed).await;
            }

            machine.select(&definition).await;
            machine.start().await;

            let mut printed = 0;
            loop {
                print_new_logs(&machine, &mut printed).await;
                if machine.state().await.mode == RunMode::Idle {
                    // Give the final log entries a moment to land
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    print_new_logs(&machine, &mut printed).await;
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }

            let analytics = store.analytics();
            if let Some(record) = analytics.execution_history.last() {
                println!(
                    "\n{} after {} step(s) in {} ms",
                    if record.success { "Finished" } else { "Failed" },
                    record.steps_completed,
                    record.duration
                );
            }
        }

        Commands::Stats => {
            let analytics = store.analytics();
            println!("Total runs:            {}", analytics.total_runs);
            println!("Successful runs:       {}", analytics.successful_runs);
            println!("Failed runs:           {}", analytics.failed_runs);
            println!("Total steps completed: {}", analytics.total_steps_completed);
            println!("Average duration (ms): {}", analytics.average_duration);
            if !analytics.workflow_stats.is_empty() {
                println!("\nPer workflow:");
                for (id, stats) in &analytics.workflow_stats {
                    println!(
                        "  {:<24} {} run(s), {} ok, {} failed, avg {} ms",
                        id,
                        stats.runs,
                        stats.successful,
                        stats.failed,
                        stats.average_duration()
                    );
                }
            }
        }

        Commands::ExportCsv { output } => {
            let csv = store.analytics_csv();
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", csv),
            }
        }

        Commands::Export { output } => {
            let json = store.export_json()?;
            std::fs::write(&output, json)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Exported to {}", output.display());
        }

        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let summary = store.import_json(&text)?;
            println!("{}", summary);
        }

        Commands::Save { file } => {
            let loaded = WorkflowLoader::new().load_workflow(&file)?;
            // Authored files may carry any id; persisted customs must be
            // custom-prefixed so they stay deletable.
            let workflow = if loaded.is_custom() {
                loaded
            } else {
                WorkflowDefinition::new_custom(loaded.name, loaded.description, loaded.steps)
            };
            let id = workflow.id.clone();
            let name = workflow.name.clone();
            store.upsert_custom_workflow(workflow)?;
            println!("Saved workflow \"{}\" as {}", name, id);
        }

        Commands::Delete { id } => {
            if !is_custom_id(&id) {
                return Err(flowsim::error::CatalogError::NotCustom(id).into());
            }
            store.delete_custom_workflow(&id)?;
            println!("Deleted {}", id);
        }

        Commands::ClearStats => {
            store.clear_analytics()?;
            println!("Analytics cleared");
        }

        Commands::Theme { value } => match value {
            Some(theme) => {
                store.set_theme(theme)?;
                println!("Theme set to {}", theme);
            }
            None => println!("{}", store.theme()),
        },
    }

    Ok(())
}

async fn print_new_logs(machine: &RunMachine, printed: &mut usize) {
    let logs = machine.logs().await;
    for entry in &logs[*printed..] {
        println!(
            "[{}] {:<7} {}",
            entry.timestamp.format("%H:%M:%S"),
            level_tag(entry.level),
            entry.message
        );
    }
    *printed = logs.len();
}

fn level_tag(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "info",
        LogLevel::Warning => "warning",
        LogLevel::Success => "success",
        LogLevel::Error => "error",
    }
}
