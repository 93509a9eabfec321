use std::collections::BTreeSet;
use std::fmt;

use crate::{Direction, Map, ObstacleKind, Pos, Session, Status};

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("U"),
            Direction::Right => f.write_str("R"),
            Direction::Down => f.write_str("D"),
            Direction::Left => f.write_str("L"),
        }
    }
}

impl ObstacleKind {
    pub(crate) fn glyph(self) -> char {
        match self {
            ObstacleKind::Wall => '#',
            ObstacleKind::Breakable => '%',
            ObstacleKind::Goal => 'g',
            ObstacleKind::Slide(Direction::Up) => '^',
            ObstacleKind::Slide(Direction::Right) => '>',
            ObstacleKind::Slide(Direction::Down) => 'v',
            ObstacleKind::Slide(Direction::Left) => '<',
        }
    }
}

/// Top row first, since `Up` grows `y`.
fn write_grid(
    f: &mut fmt::Formatter<'_>,
    map: &Map,
    player: Pos,
    broken: &BTreeSet<Pos>,
) -> fmt::Result {
    for y in (0..map.height()).rev() {
        for x in 0..map.width() {
            let pos = Pos::new(x, y);
            let glyph = match map[pos] {
                _ if pos == player => 'p',
                Some(_) if broken.contains(&pos) => '.',
                Some(kind) => kind.glyph(),
                None => '.',
            };
            write!(f, "{glyph}")?;
        }
        f.write_str("\n")?;
    }
    Ok(())
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_grid(f, self, self.player(), &BTreeSet::new())
    }
}

impl fmt::Display for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        write_grid(f, self.map(), state.pos(), state.broken())?;
        write!(f, "moves: {}", self.moves())?;
        match self.status() {
            Status::Playing => {}
            Status::Won => f.write_str(" (won)")?,
            Status::Fell => f.write_str(" (fell)")?,
            Status::Stuck => f.write_str(" (stuck)")?,
        }
        f.write_str("\n")
    }
}
