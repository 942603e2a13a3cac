//! `trackedit`: run plain-language track edits against a plan file.
//!
//! Every command builds a headless Bevy app with the edit pipeline and the
//! file-backed stores, does its work through the app's resources and exits.

mod cli;

use std::process::ExitCode;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;
use serde::Serialize;

use cli::{Cli, Command};
use save::{write_snapshot, GridSnapshot, SavePlugin};
use track::pipeline::{ActivePlanStore, ActiveRules, ReplayOutcome};
use track::seeding::FixedSeed;
use track::{
    Diagnostics, EditQueue, EditResult, EditResultLog, EditSource, PipelineConfig,
    TrackEditPipeline, TrackEditPlugin, TrackGrid, TrackParams, TrackRng,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut app = build_app(&cli);

    let ok = match &cli.command {
        Command::Edit { text } => run_edit(&mut app, text, cli.json),
        Command::Show => run_show(&mut app, cli.json),
        Command::Replay => run_replay(&mut app, &cli),
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn build_app(cli: &Cli) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin {
            level: if cli.verbose { Level::DEBUG } else { Level::WARN },
            ..default()
        })
        .add_plugins(TrackEditPlugin)
        .add_plugins(SavePlugin {
            paths: cli.save_paths(),
        })
        .insert_resource(PipelineConfig {
            parse_mode: cli.parse_mode(),
        });

    // Startup systems, no queued work yet.
    app.update();
    app
}

fn run_edit(app: &mut App, text: &str, json: bool) -> bool {
    app.world_mut()
        .resource_mut::<EditQueue>()
        .push(EditSource::Designer, text);
    app.update();

    let Some((_, result)) = app.world().resource::<EditResultLog>().last().cloned() else {
        eprintln!("edit produced no result");
        return false;
    };

    if json {
        print_json(&result);
    } else {
        match &result {
            EditResult::Applied(outcome) => {
                print_diagnostics(&outcome.diagnostics);
                println!("{}", outcome.summary);
                print!("{}", outcome.plan.to_text());
                for report in &outcome.reports {
                    print_report(report);
                }
                println!("digest {:08x}", outcome.digest);
            }
            EditResult::Failed { stage, message } => {
                eprintln!("edit failed at {stage}: {message}");
            }
        }
    }
    result.is_applied()
}

#[derive(Serialize)]
struct ShowOutput {
    plan: Option<String>,
}

fn run_show(app: &mut App, json: bool) -> bool {
    match app.world().resource::<ActivePlanStore>().0.load() {
        Ok(plan) => {
            if json {
                print_json(&ShowOutput { plan });
            } else {
                match plan {
                    Some(text) => print!("{text}"),
                    None => eprintln!("no plan saved yet"),
                }
            }
            true
        }
        Err(e) => {
            eprintln!("cannot read plan: {e}");
            false
        }
    }
}

fn run_replay(app: &mut App, cli: &Cli) -> bool {
    let world = app.world_mut();
    let params = world.resource::<TrackParams>().clone();
    let config = *world.resource::<PipelineConfig>();
    // Replay never compiles text, so a broken repository does not block it.
    let rules = match world.resource::<ActiveRules>().repository() {
        Ok(repository) => repository.clone(),
        Err(_) => Default::default(),
    };
    let mut grid = std::mem::take(&mut *world.resource_mut::<TrackGrid>());
    let mut rng = world.resource::<TrackRng>().clone();
    let mut seeds = FixedSeed(0);

    let pipeline = TrackEditPipeline::new(&rules, &params, config, &mut seeds);
    let store = world.resource::<ActivePlanStore>();
    let result = pipeline.replay(store.0.as_ref(), &mut grid, &mut rng);

    let ok = match result {
        Ok(outcome) => {
            if let Some(path) = &cli.snapshot {
                let snapshot = GridSnapshot::capture(&grid, &outcome.plan.to_text());
                if let Err(e) = write_snapshot(path, &snapshot) {
                    eprintln!("cannot write snapshot {}: {e}", path.display());
                }
            }
            print_replay(&outcome, cli.json);
            true
        }
        Err(e) => {
            eprintln!("replay failed at {}: {e}", e.stage());
            false
        }
    };

    world.insert_resource(grid);
    world.insert_resource(rng);
    ok
}

fn print_replay(outcome: &ReplayOutcome, json: bool) {
    if json {
        print_json(outcome);
        return;
    }
    print_diagnostics(&outcome.diagnostics);
    for report in &outcome.reports {
        print_report(report);
    }
    println!("digest {:08x}", outcome.digest);
}

fn print_report(report: &track::kernel::OpReport) {
    match &report.note {
        Some(note) => println!(
            "  #{} {}: {} tile(s) ({note})",
            report.index, report.op, report.affected
        ),
        None => println!(
            "  #{} {}: {} tile(s)",
            report.index, report.op, report.affected
        ),
    }
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for d in diagnostics.iter() {
        eprintln!("{:?} [{:?}] {}", d.severity, d.kind, d.message);
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("cannot encode output: {e}"),
    }
}
