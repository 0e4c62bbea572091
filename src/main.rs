//! Demonstration and fuzz driver.
//!
//! Runs a small scenario over records, then a random edit session over
//! characters, checking the table against a plain `Vec` after every step.

use std::collections::VecDeque;

use anyhow::bail;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use piecetable::{Config, PieceTable};

#[derive(Parser, Debug)]
#[command(about = "Exercise the piece table against a reference Vec")]
struct Args {
    /// Number of random operations in the fuzz run.
    #[arg(long, default_value_t = 100)]
    steps: usize,

    /// Seed for both the operation stream and node priorities.
    #[arg(long)]
    seed: Option<u64>,

    /// Undo/redo depth for the table and the reference model.
    #[arg(long, default_value_t = piecetable::config::DEFAULT_MAX_HISTORY)]
    max_history: usize,

    /// Only run the record scenario.
    #[arg(long)]
    scenario_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
}

impl User {
    fn new(name: &str) -> User {
        return User { name: name.to_string() };
    }
}

fn check<T: Clone + PartialEq + std::fmt::Debug>(
    step: &str,
    table: &PieceTable<T>,
    reference: &[T],
) -> anyhow::Result<()> {
    let actual = table.collect();
    if actual != reference {
        warn!(step, ?actual, ?reference, "mismatch");
        bail!("{step}: table diverged from reference");
    }
    table.check_invariants()?;
    info!(step, len = actual.len(), pieces = table.piece_count(), "ok");
    return Ok(());
}

fn scenario() -> anyhow::Result<()> {
    let names = ["Lila", "Comba", "Lily"];
    let mut table: PieceTable<User> = names.iter().map(|n| User::new(n)).collect();
    let mut reference: Vec<User> = names.iter().map(|n| User::new(n)).collect();

    table.insert_one(1, User::new("Jack"));
    reference.insert(1, User::new("Jack"));
    check("insert", &table, &reference)?;

    table.delete(1, 1);
    reference.remove(1);
    check("delete", &table, &reference)?;

    table.undo();
    reference.insert(1, User::new("Jack"));
    check("undo", &table, &reference)?;

    table.modify(1, |user| User::new(&format!("{} Card", user.name)));
    reference[1] = User::new("Jack Card");
    check("modify", &table, &reference)?;

    table.undo();
    reference[1] = User::new("Jack");
    check("undo modify", &table, &reference)?;

    return Ok(());
}

/// Snapshot-based undo/redo over a `Vec`, bounded like the table's history.
struct Model {
    current: Vec<char>,
    undo: VecDeque<Vec<char>>,
    redo: VecDeque<Vec<char>>,
    max_history: usize,
}

impl Model {
    fn edit(&mut self, f: impl FnOnce(&mut Vec<char>)) {
        push_bounded(&mut self.undo, self.current.clone(), self.max_history);
        self.redo.clear();
        f(&mut self.current);
    }

    fn undo(&mut self) {
        if let Some(prev) = self.undo.pop_back() {
            let current = std::mem::replace(&mut self.current, prev);
            push_bounded(&mut self.redo, current, self.max_history);
        }
    }

    fn redo(&mut self) {
        if let Some(next) = self.redo.pop_back() {
            let current = std::mem::replace(&mut self.current, next);
            push_bounded(&mut self.undo, current, self.max_history);
        }
    }
}

fn push_bounded(stack: &mut VecDeque<Vec<char>>, snapshot: Vec<char>, max: usize) {
    stack.push_back(snapshot);
    while stack.len() > max {
        stack.pop_front();
    }
}

fn fuzz(steps: usize, seed: u64, max_history: usize) -> anyhow::Result<()> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let config = Config::new().seed(seed).max_history(max_history);
    let mut table: PieceTable<char> = PieceTable::with_config(Vec::new(), config);
    let mut model = Model {
        current: Vec::new(),
        undo: VecDeque::new(),
        redo: VecDeque::new(),
        max_history,
    };

    for step in 0..steps {
        let len = model.current.len();
        let label = match rng.gen_range(0..4) {
            0 => {
                let pos = rng.gen_range(0..=len);
                let count = rng.gen_range(1..10);
                let text: Vec<char> = (0..count).map(|_| rng.gen_range('a'..='z')).collect();
                table.insert(pos, &text);
                model.edit(|v| {
                    v.splice(pos..pos, text.iter().copied());
                });
                format!("insert {count} at {pos}")
            }
            1 if len > 0 => {
                let pos = rng.gen_range(0..len);
                let count = rng.gen_range(1..=len - pos);
                let removed = table.delete(pos, count);
                let mut expected = Vec::new();
                model.edit(|v| expected = v.drain(pos..pos + count).collect());
                if removed != expected {
                    bail!("step {step}: delete returned {removed:?}, expected {expected:?}");
                }
                format!("delete {count} at {pos}")
            }
            2 if len > 0 => {
                let pos = rng.gen_range(0..len);
                let c = rng.gen_range('A'..='Z');
                if model.current[pos] != c {
                    model.edit(|v| v[pos] = c);
                }
                table.modify(pos, |_| c);
                format!("modify {pos} to {c}")
            }
            _ => {
                if rng.r#gen::<bool>() {
                    table.undo();
                    model.undo();
                    "undo".to_string()
                } else {
                    table.redo();
                    model.redo();
                    "redo".to_string()
                }
            }
        };
        check(&format!("step {step}: {label}"), &table, &model.current)?;
    }

    info!(steps, seed, add_len = table.add_len(), "fuzz run finished");
    return Ok(());
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().r#gen());

    scenario()?;
    if !args.scenario_only {
        info!(seed, steps = args.steps, "starting fuzz run");
        fuzz(args.steps, seed, args.max_history)?;
    }

    return Ok(());
}
