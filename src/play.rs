//! Live play on top of the shared slide rule.

use thiserror::Error;

use crate::{Direction, Map, MoveKind, MoveOutcome, MoveState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Playing,
    Won,
    /// Slid off the board.
    Fell,
    /// Entered a slide wall with a blocked exit.
    Stuck,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoError {
    #[error("the game is over: {0:?}")]
    GameOver(Status),
}

/// One attempt at a map, as seen by an interactive player.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    map: &'a Map,
    state: MoveState,
    moves: usize,
    status: Status,
}

impl<'a> Session<'a> {
    pub fn new(map: &'a Map) -> Self {
        Self {
            map,
            state: MoveState::initial(map),
            moves: 0,
            status: Status::Playing,
        }
    }

    pub fn map(&self) -> &'a Map {
        self.map
    }

    pub fn state(&self) -> &MoveState {
        &self.state
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Plays one input. Blocked inputs are reported but leave the session untouched.
    pub fn go(&mut self, dir: Direction) -> Result<MoveOutcome, GoError> {
        if self.status != Status::Playing {
            return Err(GoError::GameOver(self.status));
        }

        let outcome = self.state.resolve(self.map, dir);
        if outcome.is_noop() {
            return Ok(outcome);
        }

        self.state = self.state.apply(&outcome);
        self.moves += 1;
        self.status = match outcome.kind {
            MoveKind::Blocked | MoveKind::Stopped => Status::Playing,
            MoveKind::ReachedGoal => Status::Won,
            MoveKind::OutOfBounds => Status::Fell,
            MoveKind::InvalidSlideExit => Status::Stuck,
        };
        Ok(outcome)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.map);
    }
}
