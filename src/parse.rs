use std::str::FromStr;

use anyhow::{bail, ensure, Context, Result};

use crate::{Direction, Map, ObstacleKind, Pos};

impl FromStr for Map {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = s
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let first = lines.first().context("Missing board content")?;
        let width = first.chars().count();
        let height = lines.len();

        let mut player = None;
        let mut obstacles = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            ensure!(
                line.chars().count() == width,
                "Width mismatch on line {}, expecting width {width}",
                i + 1,
            );
            let y = (height - 1 - i) as i32;
            for (x, ch) in line.chars().enumerate() {
                let pos = Pos::new(x as i32, y);
                let kind = match ch {
                    '.' => continue,
                    'p' => {
                        ensure!(player.is_none(), "Multiple players");
                        player = Some(pos);
                        continue;
                    }
                    '#' => ObstacleKind::Wall,
                    '%' => ObstacleKind::Breakable,
                    'g' => ObstacleKind::Goal,
                    '^' => ObstacleKind::Slide(Direction::Up),
                    '>' => ObstacleKind::Slide(Direction::Right),
                    'v' => ObstacleKind::Slide(Direction::Down),
                    '<' => ObstacleKind::Slide(Direction::Left),
                    _ => bail!("Invalid cell: {ch:?}"),
                };
                obstacles.push((pos, kind));
            }
        }

        let player = player.context("Missing player")?;
        let map = Map::new(width as i32, height as i32, player, obstacles)?;
        Ok(map)
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "U" => Direction::Up,
            "R" => Direction::Right,
            "D" => Direction::Down,
            "L" => Direction::Left,
            _ => bail!("Invalid direction: {s:?}"),
        })
    }
}
