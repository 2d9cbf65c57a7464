use std::fs;

use crate::data::player::PlayerState;
use crate::data::registry::GameDataRegistry;
use crate::optimizer::{solve_assignment, SolverConfig, DEFAULT_SOLVE_TIME_LIMIT};
use crate::parallel::{run_trials, RunMode, WorkerPool};

const LP_DUMP_PATH: &str = "problem.lp";
const SOLUTION_DETAILS_PATH: &str = "solution_details.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Solve,
    Test,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("solve") => Some(Command::Solve),
        Some("test") => Some(Command::Test),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Solve) => handle_solve(args),
        Some(Command::Test) => handle_test(args),
        None => {
            eprintln!("usage: foreman <solve|test>");
            2
        }
    }
}

fn handle_solve(args: &[String]) -> i32 {
    let (Some(game_path), Some(player_path)) = (args.get(2), args.get(3)) else {
        eprintln!(
            "usage: foreman solve <game-data.json> <player-data.json> [solve-secs] [--lp-file] [--solution-detail]"
        );
        return 2;
    };

    let solve_secs = parse_f64_arg(
        args.get(4).filter(|arg| !arg.starts_with("--")),
        "solve-secs",
        DEFAULT_SOLVE_TIME_LIMIT,
    );
    let config = SolverConfig {
        solve_time_limit: solve_secs,
        gen_lp_file: args.iter().any(|arg| arg == "--lp-file"),
        gen_solution_details: args.iter().any(|arg| arg == "--solution-detail"),
        ..SolverConfig::default()
    };

    let Some(game_json) = read_input(game_path) else {
        return 1;
    };
    let Some(player_json) = read_input(player_path) else {
        return 1;
    };

    let registry = match GameDataRegistry::load(&game_json) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("game data error: {err}");
            return 1;
        }
    };
    let player = match PlayerState::parse(&player_json) {
        Ok(player) => player,
        Err(err) => {
            eprintln!("player data error: {err}");
            return 1;
        }
    };

    let mut result = solve_assignment(&registry, &player, &config);

    if let Some(dump) = result.lp_problem.take() {
        if let Err(err) = fs::write(LP_DUMP_PATH, dump) {
            eprintln!("failed to write {LP_DUMP_PATH}: {err}");
            return 1;
        }
        println!("wrote {LP_DUMP_PATH}");
    }
    if let Some(details) = result.solution_details.take() {
        if let Err(err) = fs::write(SOLUTION_DETAILS_PATH, details) {
            eprintln!("failed to write {SOLUTION_DETAILS_PATH}: {err}");
            return 1;
        }
        println!("wrote {SOLUTION_DETAILS_PATH}");
    }

    match serde_json::to_string_pretty(&result) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize result: {err}");
            1
        }
    }
}

fn handle_test(args: &[String]) -> i32 {
    let (Some(mode_arg), Some(game_path), Some(player_path)) =
        (args.get(2), args.get(3), args.get(4))
    else {
        eprintln!("usage: foreman test <once|sequential|parallel> <game-data.json> <player-data.json> [param]");
        return 2;
    };

    let mode = match mode_arg.as_str() {
        "once" => RunMode::Once,
        "sequential" => RunMode::Sequential(parse_usize_arg(args.get(5), "param", 1)),
        "parallel" => RunMode::Parallel(parse_usize_arg(args.get(5), "param", 2)),
        other => {
            eprintln!("unknown test mode '{other}' (expected once|sequential|parallel)");
            return 2;
        }
    };

    let Some(game_json) = read_input(game_path) else {
        return 1;
    };
    let Some(player_json) = read_input(player_path) else {
        return 1;
    };

    let registry = match GameDataRegistry::load(&game_json) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("game data error: {err}");
            return 1;
        }
    };

    let config = SolverConfig::default();
    let pool = WorkerPool::default_workers();
    match run_trials(&registry, &player_json, &config, mode, &pool) {
        Ok(reports) => {
            for (number, report) in reports.iter().enumerate() {
                println!(
                    "trial {}: {:?}, objective {:.3}, {} assignment(s), {:.1}ms",
                    number + 1,
                    report.result.status,
                    report.result.objective,
                    report.result.assignments.len(),
                    report.elapsed.as_secs_f64() * 1000.0
                );
            }
            0
        }
        Err(err) => {
            eprintln!("test run failed: {err}");
            1
        }
    }
}

fn read_input(path: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            eprintln!("failed to read '{path}': {err}");
            None
        }
    }
}

fn parse_f64_arg(raw: Option<&String>, name: &str, default: f64) -> f64 {
    raw.and_then(|value| value.parse::<f64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
