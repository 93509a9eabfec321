use anyhow::{ensure, Context};
use slide_solver::{solve, Map};

use crate::common::*;

mod common;

fn main() {
    run_tests("solve", |content| {
        let map = content
            .split_once(SEPARATOR)
            .map_or(content, |(input, _)| input)
            .trim();
        let parsed = map.parse::<Map>().context("Invalid map")?;

        let result = solve(&parsed);
        let steps = if result.solvable {
            // Validate.
            let outcomes = parsed.replay(&result.optimal_path).context("Invalid solution")?;
            ensure!(outcomes.len() == result.min_moves, "Move count mismatch");
            fmt_path(&result.optimal_path)
        } else {
            ensure!(result.min_moves == 0 && result.optimal_path.is_empty());
            "unsolvable".to_owned()
        };

        Ok(format!("{map}\n\n{SEPARATOR}{steps}\n"))
    });
}
