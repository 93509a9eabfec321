//! Random maps with an exact solution length.
//!
//! Candidates are laid out at random and checked with the solver; anything
//! that does not need exactly the requested number of moves is thrown away.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::solve::solve;
use crate::{Direction, Map, MapError, ObstacleKind, Pos, MAX_SIDE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub width: i32,
    pub height: i32,
    pub max_attempts: u32,
    /// Checked before every attempt.
    pub time_limit: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 15,
            height: 15,
            max_attempts: 10_000,
            time_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("target move count must be at least 1")]
    InvalidTarget,
    #[error("a {width}x{height} board cannot hold a player and a goal")]
    BoardTooSmall { width: i32, height: i32 },
    #[error("could not generate a map with {target_moves} moves in {attempts} attempts (seed {seed})")]
    Exhausted {
        target_moves: usize,
        attempts: u32,
        seed: u64,
    },
    #[error("generation cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
    #[error("generation timed out after {attempts} attempts")]
    TimedOut { attempts: u32 },
}

/// Generates a `target_moves` map on the default board.
pub fn generate(
    target_moves: usize,
    seed: Option<u64>,
    max_attempts: u32,
) -> Result<Map, GenerateError> {
    let config = GeneratorConfig {
        max_attempts,
        ..Default::default()
    };
    Generator::new(config, seed).run(target_moves, |_| ControlFlow::Continue(()))
}

pub struct Generator {
    config: GeneratorConfig,
    seed: u64,
    rng: StdRng,
}

impl Generator {
    /// Without a seed a fresh one is drawn; either way it is kept for reproduction.
    pub fn new(config: GeneratorConfig, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            config,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs the generate-validate loop.
    ///
    /// `on_attempt` is called with the 1-based attempt number before each
    /// attempt; breaking out of it cancels generation. The RNG stream carries
    /// on across attempts, so a rerun with the same seed retraces every one.
    pub fn run(
        &mut self,
        target_moves: usize,
        mut on_attempt: impl FnMut(u32) -> ControlFlow<()>,
    ) -> Result<Map, GenerateError> {
        if target_moves == 0 {
            return Err(GenerateError::InvalidTarget);
        }
        let GeneratorConfig { width, height, .. } = self.config;
        if !(1..=MAX_SIDE).contains(&width)
            || !(1..=MAX_SIDE).contains(&height)
            || width * height < 2
        {
            return Err(GenerateError::BoardTooSmall { width, height });
        }

        let started = Instant::now();
        for attempt in 1..=self.config.max_attempts {
            if on_attempt(attempt).is_break() {
                warn!("[Generator] cancelled after {} attempts", attempt - 1);
                return Err(GenerateError::Cancelled {
                    attempts: attempt - 1,
                });
            }
            if let Some(limit) = self.config.time_limit {
                if started.elapsed() >= limit {
                    warn!("[Generator] timed out after {} attempts", attempt - 1);
                    return Err(GenerateError::TimedOut {
                        attempts: attempt - 1,
                    });
                }
            }

            let map = match self.candidate(target_moves) {
                Ok(map) => map,
                Err(err) => {
                    debug!("[Generator] attempt {attempt}: invalid layout: {err}");
                    continue;
                }
            };

            let result = solve(&map);
            if !result.solvable {
                debug!("[Generator] attempt {attempt}: map is unsolvable");
                continue;
            }
            if result.min_moves != target_moves {
                debug!(
                    "[Generator] attempt {attempt}: move count mismatch (target: {target_moves}, actual: {})",
                    result.min_moves
                );
                continue;
            }

            info!(
                "[Generator] attempt {attempt}: found a {target_moves}-move map (seed {})",
                self.seed
            );
            return Ok(map
                .with_optimal_path(result.optimal_path)
                .with_seed(self.seed));
        }

        warn!(
            "[Generator] no {target_moves}-move map after {} attempts (seed {})",
            self.config.max_attempts, self.seed
        );
        Err(GenerateError::Exhausted {
            target_moves,
            attempts: self.config.max_attempts,
            seed: self.seed,
        })
    }

    fn candidate(&mut self, target_moves: usize) -> Result<Map, MapError> {
        let GeneratorConfig { width, height, .. } = self.config;
        let mut free = (0..height)
            .flat_map(|y| (0..width).map(move |x| Pos::new(x, y)))
            .collect::<Vec<_>>();

        let player = self
            .take_random(&mut free)
            .ok_or(MapError::InvalidSize { width, height })?;
        let goal = self
            .take_goal(&mut free, player, target_moves)
            .ok_or(MapError::MissingGoal)?;
        let mut obstacles = vec![(goal, ObstacleKind::Goal)];

        let walls = self.wall_count(target_moves);
        let breakables = self.breakable_count(target_moves);
        let slides = self.slide_count(target_moves);

        self.scatter(&mut free, &mut obstacles, walls, |_| ObstacleKind::Wall);
        self.scatter(&mut free, &mut obstacles, breakables, |_| {
            ObstacleKind::Breakable
        });
        self.scatter(&mut free, &mut obstacles, slides, |rng| {
            ObstacleKind::Slide(Direction::ALL[rng.random_range(0..4)])
        });

        Map::new(width, height, player, obstacles)
    }

    fn scatter(
        &mut self,
        free: &mut Vec<Pos>,
        obstacles: &mut Vec<(Pos, ObstacleKind)>,
        count: usize,
        mut kind: impl FnMut(&mut StdRng) -> ObstacleKind,
    ) {
        for _ in 0..count {
            // Always leave one cell open.
            if free.len() <= 1 {
                break;
            }
            let Some(pos) = self.take_random(free) else {
                break;
            };
            obstacles.push((pos, kind(&mut self.rng)));
        }
    }

    fn take_random(&mut self, free: &mut Vec<Pos>) -> Option<Pos> {
        if free.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..free.len());
        Some(free.swap_remove(idx))
    }

    /// Prefers cells at a Manhattan distance that suits the target.
    fn take_goal(&mut self, free: &mut Vec<Pos>, player: Pos, target_moves: usize) -> Option<Pos> {
        let target = target_moves.min(MAX_SIDE as usize * 4) as i32;
        let min_dist = (target / 2).max(2);
        let max_dist = (self.config.width + self.config.height - 2).min(target * 2);
        let candidates = free
            .iter()
            .enumerate()
            .filter(|(_, pos)| (min_dist..=max_dist).contains(&pos.manhattan(player)))
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            return self.take_random(free);
        }
        let idx = candidates[self.rng.random_range(0..candidates.len())];
        Some(free.swap_remove(idx))
    }

    fn wall_count(&mut self, target_moves: usize) -> usize {
        let multiplier = self.rng.random_range(0.5..1.5);
        (target_moves as f64 * multiplier).round() as usize
    }

    fn breakable_count(&mut self, target_moves: usize) -> usize {
        match target_moves {
            0..=2 => 0,
            3..=5 => self.rng.random_range(0..2),
            6..=9 => self.rng.random_range(0..3),
            _ => self.rng.random_range(1..4),
        }
    }

    fn slide_count(&mut self, target_moves: usize) -> usize {
        match target_moves {
            0..=3 => 0,
            4..=7 => self.rng.random_range(0..2),
            8..=11 => self.rng.random_range(0..3),
            _ => self.rng.random_range(1..4),
        }
    }
}
