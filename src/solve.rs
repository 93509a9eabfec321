use std::ops::ControlFlow;

use arrayvec::ArrayVec;
use log::debug;

use crate::{Direction, Map, MoveKind, MoveState};

type IndexMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult {
    pub solvable: bool,
    pub min_moves: usize,
    pub optimal_path: Vec<Direction>,
    /// Number of states expanded before the search finished.
    pub explored: usize,
}

impl SolverResult {
    fn unsolvable(explored: usize) -> Self {
        Self {
            solvable: false,
            min_moves: 0,
            optimal_path: Vec::new(),
            explored,
        }
    }
}

enum Transition {
    Goal,
    State(MoveState),
}

fn transitions(map: &Map, state: &MoveState) -> ArrayVec<(Direction, Transition), 4> {
    let mut ret = ArrayVec::new();
    for dir in Direction::ALL {
        let outcome = state.resolve(map, dir);
        let next = match outcome.kind {
            MoveKind::Blocked | MoveKind::OutOfBounds | MoveKind::InvalidSlideExit => continue,
            MoveKind::ReachedGoal => Transition::Goal,
            MoveKind::Stopped => Transition::State(state.apply(&outcome)),
        };
        ret.push((dir, next));
    }
    ret
}

/// Finds a shortest solution, or proves there is none.
pub fn solve(map: &Map) -> SolverResult {
    match bfs(map, || ControlFlow::Continue(())) {
        Some(result) => result,
        None => unreachable!("the search is never interrupted"),
    }
}

/// Breadth-first search over move states.
///
/// `on_step` runs before each state is expanded; breaking out of it abandons
/// the search and yields `None`.
pub fn bfs(map: &Map, mut on_step: impl FnMut() -> ControlFlow<()>) -> Option<SolverResult> {
    // Insertion order doubles as the queue, keys as the visited set.
    let mut state_parent = IndexMap::default();
    state_parent.insert(MoveState::initial(map), (!0usize, Direction::Up)); // Sentinel.

    let mut cursor = 0;
    let final_step = 'bfs: loop {
        #[cfg(feature = "coz")]
        coz::scope!("Expand");

        let Some((state, _)) = state_parent.get_index(cursor) else {
            debug!("[Solver] exhausted {cursor} states without reaching the goal");
            return Some(SolverResult::unsolvable(cursor));
        };
        if on_step().is_break() {
            return None;
        }

        for (dir, next) in transitions(map, state) {
            match next {
                // BFS reaches the goal at the smallest depth first.
                Transition::Goal => break 'bfs (cursor, dir),
                Transition::State(next) => {
                    state_parent.entry(next).or_insert((cursor, dir));
                }
            }
        }
        cursor += 1;
    };

    let mut path = std::iter::successors(Some(final_step), |&(i, _)| {
        let (parent, dir) = state_parent[i];
        (parent != !0usize).then_some((parent, dir))
    })
    .map(|(_, dir)| dir)
    .collect::<Vec<_>>();
    path.reverse();

    debug!(
        "[Solver] solved in {} moves after expanding {} states",
        path.len(),
        cursor + 1
    );
    Some(SolverResult {
        solvable: true,
        min_moves: path.len(),
        optimal_path: path,
        explored: cursor + 1,
    })
}
