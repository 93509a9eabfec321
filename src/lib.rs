use std::collections::BTreeSet;
use std::ops::Index;

use thiserror::Error;

mod fmt;
mod json;
mod parse;
pub mod generate;
pub mod play;
pub mod solve;

pub use generate::{generate, GenerateError, Generator, GeneratorConfig};
pub use play::{GoError, Session, Status};
pub use solve::{solve, SolverResult};

/// Boards larger than this on either side are rejected.
pub const MAX_SIDE: i32 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("invalid board size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("{0} lies outside the board")]
    OutOfRange(Pos),
    #[error("more than one object at {0}")]
    DuplicateCell(Pos),
    #[error("missing goal")]
    MissingGoal,
    #[error("multiple goals at {0} and {1}")]
    MultipleGoals(Pos, Pos),
    #[error("player starts on the obstacle at {0}")]
    PlayerOnObstacle(Pos),
    #[error("cannot move from {0}, it is occupied by an obstacle")]
    Occupied(Pos),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("step {0} does not move")]
    Blocked(usize),
    #[error("step {0} ends in {1:?}")]
    DeadEnd(usize, MoveKind),
    #[error("step {0} reaches the goal before the path ends")]
    PastGoal(usize),
    #[error("path ends without reaching the goal")]
    NotSolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Numeric values are the persisted encoding of optimal paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up = 0,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// `Up` points towards larger `y`.
    pub fn offset(self) -> (i32, i32) {
        const OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
        OFFSETS[self as usize]
    }
}

impl TryFrom<u8> for Direction {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(code as usize).copied().ok_or(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Wall,
    Breakable,
    Goal,
    /// Moves whoever enters it exactly one more cell in the given direction.
    Slide(Direction),
}

/// An immutable, validated puzzle board.
///
/// Broken walls are never recorded here; they live in [`MoveState`] so the same
/// map can be played and solved any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    width: i32,
    height: i32,
    player: Pos,
    goal: Pos,
    grid: Box<[Option<ObstacleKind>]>,
    optimal_path: Option<Vec<Direction>>,
    seed: Option<u64>,
}

impl Index<Pos> for Map {
    type Output = Option<ObstacleKind>;
    fn index(&self, pos: Pos) -> &Self::Output {
        &self.grid[self.offset_of(pos)]
    }
}

impl Map {
    pub fn new(
        width: i32,
        height: i32,
        player: Pos,
        obstacles: impl IntoIterator<Item = (Pos, ObstacleKind)>,
    ) -> Result<Self, MapError> {
        if !(1..=MAX_SIDE).contains(&width) || !(1..=MAX_SIDE).contains(&height) {
            return Err(MapError::InvalidSize { width, height });
        }

        let mut map = Map {
            width,
            height,
            player,
            goal: player,
            grid: vec![None; (width * height) as usize].into(),
            optimal_path: None,
            seed: None,
        };
        if !map.contains(player) {
            return Err(MapError::OutOfRange(player));
        }

        let mut goal = None;
        for (pos, kind) in obstacles {
            if !map.contains(pos) {
                return Err(MapError::OutOfRange(pos));
            }
            if pos == player {
                return Err(MapError::PlayerOnObstacle(pos));
            }
            let idx = map.offset_of(pos);
            if map.grid[idx].is_some() {
                return Err(MapError::DuplicateCell(pos));
            }
            map.grid[idx] = Some(kind);
            if kind == ObstacleKind::Goal {
                if let Some(first) = goal {
                    return Err(MapError::MultipleGoals(first, pos));
                }
                goal = Some(pos);
            }
        }
        map.goal = goal.ok_or(MapError::MissingGoal)?;
        Ok(map)
    }

    pub fn with_optimal_path(mut self, path: Vec<Direction>) -> Self {
        self.optimal_path = Some(path);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn optimal_path(&self) -> Option<&[Direction]> {
        self.optimal_path.as_deref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn contains(&self, pos: Pos) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    pub fn get(&self, pos: Pos) -> Option<ObstacleKind> {
        if !self.contains(pos) {
            return None;
        }
        self[pos]
    }

    /// Every cell in row-major order, bottom row first.
    pub fn cells(&self) -> impl Iterator<Item = Pos> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Pos::new(x, y)))
    }

    pub fn obstacles(&self) -> impl Iterator<Item = (Pos, ObstacleKind)> + '_ {
        self.cells()
            .filter_map(|pos| self[pos].map(|kind| (pos, kind)))
    }

    fn offset_of(&self, pos: Pos) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Resolves a single slide from an arbitrary resting cell.
    ///
    /// Only call this for moves that are actually attempted: a pending
    /// breakable wall ahead of `from` breaks as part of the call.
    pub fn resolve(
        &self,
        broken: &BTreeSet<Pos>,
        from: Pos,
        dir: Direction,
        pending: Option<Pos>,
    ) -> Result<MoveOutcome, MapError> {
        if !self.contains(from) {
            return Err(MapError::OutOfRange(from));
        }
        if self[from].is_some_and(|kind| {
            kind != ObstacleKind::Breakable || !broken.contains(&from)
        }) {
            return Err(MapError::Occupied(from));
        }
        Ok(self.slide(broken, from, dir, pending))
    }

    fn slide(
        &self,
        broken: &BTreeSet<Pos>,
        from: Pos,
        dir: Direction,
        pending: Option<Pos>,
    ) -> MoveOutcome {
        // A marked wall only gives way to a push towards it.
        let broke = pending.filter(|&wall| wall == from.step(dir));
        let is_intact = |pos: Pos| broke != Some(pos) && !broken.contains(&pos);
        let outcome = |kind, to, pending| MoveOutcome {
            kind,
            to,
            pending,
            broke,
        };
        let stop = |to: Pos, armed: Option<Pos>| {
            // Standing still without breaking anything changes nothing, not even the mark.
            if to == from && broke.is_none() {
                MoveOutcome {
                    kind: MoveKind::Blocked,
                    to,
                    pending,
                    broke: None,
                }
            } else {
                outcome(MoveKind::Stopped, to, armed)
            }
        };

        let mut cur = from;
        loop {
            let next = cur.step(dir);
            if !self.contains(next) {
                return outcome(MoveKind::OutOfBounds, next, None);
            }
            let Some(kind) = self[next].filter(|_| is_intact(next)) else {
                cur = next;
                continue;
            };
            return match kind {
                ObstacleKind::Wall => stop(cur, None),
                ObstacleKind::Breakable => stop(cur, Some(next)),
                ObstacleKind::Goal => outcome(MoveKind::ReachedGoal, next, None),
                ObstacleKind::Slide(exit_dir) => {
                    let exit = next.step(exit_dir);
                    if !self.contains(exit) {
                        return outcome(MoveKind::InvalidSlideExit, next, None);
                    }
                    match self[exit] {
                        Some(ObstacleKind::Goal) => outcome(MoveKind::ReachedGoal, exit, None),
                        Some(_) if is_intact(exit) => {
                            outcome(MoveKind::InvalidSlideExit, next, None)
                        }
                        _ => stop(exit, None),
                    }
                }
            };
        }
    }

    /// Plays `path` from the spawn state and checks that it wins on its last step.
    pub fn replay(&self, path: &[Direction]) -> Result<Vec<MoveOutcome>, ReplayError> {
        let mut state = MoveState::initial(self);
        let mut outcomes = Vec::with_capacity(path.len());
        for (i, &dir) in path.iter().enumerate() {
            let outcome = state.resolve(self, dir);
            match outcome.kind {
                MoveKind::Blocked => return Err(ReplayError::Blocked(i)),
                MoveKind::OutOfBounds | MoveKind::InvalidSlideExit => {
                    return Err(ReplayError::DeadEnd(i, outcome.kind))
                }
                MoveKind::ReachedGoal if i + 1 != path.len() => {
                    return Err(ReplayError::PastGoal(i))
                }
                MoveKind::ReachedGoal | MoveKind::Stopped => {}
            }
            state = state.apply(&outcome);
            outcomes.push(outcome);
        }
        match outcomes.last() {
            Some(last) if last.reached_goal() => Ok(outcomes),
            _ => Err(ReplayError::NotSolved),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Nothing changed. Callers must not count or record it.
    Blocked,
    /// Came to rest on a different cell of the board.
    Stopped,
    ReachedGoal,
    /// Slid off the board.
    OutOfBounds,
    /// Entered a slide wall whose exit is off the board or obstructed.
    InvalidSlideExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveOutcome {
    pub kind: MoveKind,
    /// For `InvalidSlideExit` this is the slide wall that could not be left.
    pub to: Pos,
    /// The breakable wall that will give way to the next push towards it.
    pub pending: Option<Pos>,
    pub broke: Option<Pos>,
}

impl MoveOutcome {
    pub fn reached_goal(&self) -> bool {
        self.kind == MoveKind::ReachedGoal
    }

    pub fn out_of_bounds(&self) -> bool {
        self.kind == MoveKind::OutOfBounds
    }

    pub fn wall_just_broken(&self) -> bool {
        self.broke.is_some()
    }

    pub fn is_noop(&self) -> bool {
        self.kind == MoveKind::Blocked
    }

    pub fn is_dead_end(&self) -> bool {
        matches!(self.kind, MoveKind::OutOfBounds | MoveKind::InvalidSlideExit)
    }
}

/// Position plus everything the player has done to the board so far.
///
/// The derived `Eq`/`Hash` are the canonical key used for deduplication: the
/// broken set is ordered, so equal sets always compare and hash alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveState {
    pos: Pos,
    broken: BTreeSet<Pos>,
    pending: Option<Pos>,
}

impl MoveState {
    /// The spawn state. A breakable wall next to the start is marked right away.
    pub fn initial(map: &Map) -> Self {
        let pending = Direction::ALL
            .into_iter()
            .map(|dir| map.player.step(dir))
            .find(|&pos| map.get(pos) == Some(ObstacleKind::Breakable));
        Self {
            pos: map.player,
            broken: BTreeSet::new(),
            pending,
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn broken(&self) -> &BTreeSet<Pos> {
        &self.broken
    }

    pub fn pending(&self) -> Option<Pos> {
        self.pending
    }

    pub fn resolve(&self, map: &Map, dir: Direction) -> MoveOutcome {
        map.slide(&self.broken, self.pos, dir, self.pending)
    }

    pub fn apply(&self, outcome: &MoveOutcome) -> Self {
        let mut broken = self.broken.clone();
        broken.extend(outcome.broke);
        Self {
            pos: outcome.to,
            broken,
            pending: outcome.pending,
        }
    }
}
