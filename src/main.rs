use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;
use sokoban_uct::heuristic::{ChildPolicy, NearestBoxes, RandomChild};
use sokoban_uct::pathfind::lurd;
use sokoban_uct::solver::{SearchLimits, SolveResult, Solver, SolverConfig, Tracer};
use sokoban_uct::status::{DeadlockDetection, Status};
use sokoban_uct::tree::{NodeId, Tree};
use sokoban_uct::{Game, Levels, Position};
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyType {
    Nearest,
    Random,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Deadlocks {
    Baseline,
    DeadSquares,
}

impl From<Deadlocks> for DeadlockDetection {
    fn from(mode: Deadlocks) -> Self {
        match mode {
            Deadlocks::Baseline => DeadlockDetection::Baseline,
            Deadlocks::DeadSquares => DeadlockDetection::DeadSquares,
        }
    }
}

fn print_solution(game: &Game, solution: &[Position]) -> Result<()> {
    println!("\nStarting position:\n{}", game);
    let states = game.replay(solution).context("solution does not replay")?;
    let total = solution.len();
    for (count, (pos, state)) in solution.iter().zip(&states).enumerate() {
        println!("Move to {} ({}/{}):\n{}", pos, count + 1, total, state);
    }
    Ok(())
}

struct VerboseTracer {
    trace_start: usize,
    trace_end: usize,
}

impl VerboseTracer {
    fn new(from_iteration: usize, to_iteration: usize) -> Self {
        Self {
            trace_start: from_iteration,
            trace_end: to_iteration,
        }
    }
}

impl Tracer for VerboseTracer {
    fn trace(&self, iteration: usize, tree: &Tree, node: NodeId, status: Status) {
        if self.trace_start <= iteration && iteration <= self.trace_end {
            let eval = tree.get(node).eval;
            println!(
                "iteration={}, node={}, depth={}, status={}, visits={}, score={}:\n{}",
                iteration,
                node.index(),
                tree.depth(node),
                status,
                eval.visits,
                eval.score,
                tree.get(node).state
            );
        }
    }
}

struct LevelStats {
    solved: bool,
    steps: usize,
    iterations: usize,
    elapsed_ms: u128,
}

struct SolveOpts {
    level_num: usize,
    config: SolverConfig,
    print_solution: bool,
    trace_range: Option<(usize, usize)>,
}

fn solve_level_helper<P: ChildPolicy>(game: &Game, opts: SolveOpts, policy: P) -> Result<LevelStats> {
    let solver = Solver::new(game.clone(), opts.config, policy);
    let (result, stats) = match opts.trace_range {
        Some((start, end)) => {
            let mut solver = solver.with_tracer(VerboseTracer::new(start, end));
            (solver.solve(), solver.stats())
        }
        None => {
            let mut solver = solver;
            (solver.solve(), solver.stats())
        }
    };
    let elapsed_ms = stats.elapsed.as_millis();

    let (solved_char, solution_len, solved) = match &result {
        SolveResult::Solved(solution) => ('Y', solution.len(), true),
        SolveResult::Cutoff => ('N', 0, false),
        SolveResult::Impossible => ('X', 0, false),
    };

    println!(
        "level: {:<3}  solved: {}  steps: {:<5}  iterations: {:<10}  nodes: {:<10}  elapsed: {} ms",
        opts.level_num, solved_char, solution_len, stats.iterations, stats.nodes, elapsed_ms
    );

    if let SolveResult::Solved(solution) = &result {
        println!("solution: {}", lurd(game, solution)?);
        if opts.print_solution {
            print_solution(game, solution)?;
        }
    }

    Ok(LevelStats {
        solved,
        steps: solution_len,
        iterations: stats.iterations,
        elapsed_ms,
    })
}

fn solve_level(game: &Game, opts: SolveOpts, policy: PolicyType, seed: u64) -> Result<LevelStats> {
    match policy {
        PolicyType::Nearest => solve_level_helper(game, opts, NearestBoxes::new()),
        PolicyType::Random => solve_level_helper(game, opts, RandomChild::new(seed)),
    }
}

#[derive(Parser)]
#[command(name = "sokoban-uct")]
#[command(about = "A Sokoban solver using UCT tree search", long_about = None)]
struct Args {
    /// Path to the levels file
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL", default_value = "1")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Print the solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Maximum number of search iterations before giving up (0 = no limit)
    #[arg(short = 'n', long, default_value = "1000000")]
    max_iterations: usize,

    /// Wall-clock limit per level in milliseconds
    #[arg(short = 't', long)]
    time_limit_ms: Option<u64>,

    /// UCT exploration constant
    #[arg(short = 'c', long, default_value_t = std::f64::consts::SQRT_2)]
    exploration: f64,

    /// Score bonus for states with a box on a goal
    #[arg(long, default_value = "50")]
    goal_bonus: i64,

    /// How to pick which expanded child is evaluated
    #[arg(short = 'P', long, value_enum, default_value = "nearest")]
    policy: PolicyType,

    /// Seed for the random child policy
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Dead-end detection
    #[arg(short = 'd', long, value_enum, default_value = "baseline")]
    deadlocks: Deadlocks,

    /// Range of iterations to trace (start, end)
    #[arg(long, num_args = 2)]
    trace_range: Option<Vec<usize>>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure logging
    let default_level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Load levels from file
    let levels = Levels::from_file(&args.levels_file)
        .with_context(|| format!("loading levels from {}", args.levels_file))?;

    // Determine the range of levels to solve
    let level_end = args.level_end.unwrap_or(args.level_start);
    let num_levels = level_end.saturating_sub(args.level_start) + 1;

    // Validate range
    if args.level_start == 0 {
        bail!("level numbers must be at least 1");
    }
    if level_end < args.level_start {
        bail!("level end must be >= level start");
    }
    if level_end > levels.len() {
        bail!(
            "level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
    }
    if args.print_solution && num_levels > 1 {
        bail!("solution printing only supported when solving a single level");
    }

    // Validate trace_range and convert it to a tuple
    let trace_range = match args.trace_range.as_deref() {
        Some([start, end]) if start > end => bail!("trace range start must be <= end"),
        Some([start, end]) => Some((*start, *end)),
        _ => None,
    };

    let config = SolverConfig {
        limits: SearchLimits {
            max_iterations: (args.max_iterations > 0).then_some(args.max_iterations),
            time_limit: args.time_limit_ms.map(Duration::from_millis),
        },
        exploration: args.exploration,
        goal_bonus: args.goal_bonus,
        deadlocks: args.deadlocks.into(),
    };
    info!("solving levels {}..={} with {:?}", args.level_start, level_end, config);

    // Solve each level in the range
    let mut total_solved = 0;
    let mut total_steps = 0;
    let mut total_iterations = 0;
    let mut total_time_ms = 0;

    for level_num in args.level_start..=level_end {
        let game = levels
            .get(level_num - 1)
            .with_context(|| format!("level {} missing", level_num))?;
        let opts = SolveOpts {
            level_num,
            config,
            print_solution: args.print_solution,
            trace_range,
        };
        let stats = solve_level(game, opts, args.policy, args.seed)?;

        if stats.solved {
            total_solved += 1;
        }
        total_steps += stats.steps;
        total_iterations += stats.iterations;
        total_time_ms += stats.elapsed_ms;
    }

    // Print summary statistics if multiple levels were solved
    if num_levels > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        steps: {:<5}  iterations: {:<10}  elapsed: {} ms",
            total_solved, num_levels, total_steps, total_iterations, total_time_ms
        );
    }

    Ok(())
}
