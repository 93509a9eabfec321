//! Map files as written by the level editor.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{Direction, Map, ObstacleKind, Pos};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MapFile {
    map_size: Size,
    #[serde(default)]
    optimal_path: Vec<u8>,
    map_objects: Vec<MapObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Size {
    x: i32,
    y: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MapObject {
    #[serde(rename = "Type")]
    kind: ObjectType,
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
enum ObjectType {
    Player,
    Obstacle(ObstacleKind),
}

impl TryFrom<u8> for ObjectType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let kind = match code {
            0 => return Ok(Self::Player),
            1 => ObstacleKind::Wall,
            2 => ObstacleKind::Goal,
            3 => ObstacleKind::Breakable,
            10..=13 => ObstacleKind::Slide(Direction::ALL[(code - 10) as usize]),
            _ => return Err(format!("unknown object type {code}")),
        };
        Ok(Self::Obstacle(kind))
    }
}

impl From<ObjectType> for u8 {
    fn from(ty: ObjectType) -> Self {
        match ty {
            ObjectType::Player => 0,
            ObjectType::Obstacle(ObstacleKind::Wall) => 1,
            ObjectType::Obstacle(ObstacleKind::Goal) => 2,
            ObjectType::Obstacle(ObstacleKind::Breakable) => 3,
            ObjectType::Obstacle(ObstacleKind::Slide(dir)) => 10 + dir as u8,
        }
    }
}

impl Map {
    /// Reads the editor's JSON layout. An empty `OptimalPath` means none is stored.
    pub fn from_json(s: &str) -> Result<Self> {
        let file = serde_json::from_str::<MapFile>(s).context("Invalid map JSON")?;

        let mut player = None;
        let mut obstacles = Vec::with_capacity(file.map_objects.len());
        for obj in &file.map_objects {
            let pos = Pos::new(obj.x, obj.y);
            match obj.kind {
                ObjectType::Player => {
                    ensure!(player.is_none(), "Multiple players");
                    player = Some(pos);
                }
                ObjectType::Obstacle(kind) => obstacles.push((pos, kind)),
            }
        }
        let player = player.context("Missing player")?;

        let mut map = Map::new(file.map_size.x, file.map_size.y, player, obstacles)?;
        if !file.optimal_path.is_empty() {
            let path = file
                .optimal_path
                .iter()
                .map(|&code| Direction::try_from(code))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|code| anyhow::anyhow!("Invalid direction code {code} in path"))?;
            map = map.with_optimal_path(path);
        }
        if let Some(seed) = file.seed {
            map = map.with_seed(seed);
        }
        Ok(map)
    }

    pub fn to_json(&self) -> Result<String> {
        let player = MapObject {
            kind: ObjectType::Player,
            x: self.player().x,
            y: self.player().y,
        };
        let obstacles = self.obstacles().map(|(pos, kind)| MapObject {
            kind: ObjectType::Obstacle(kind),
            x: pos.x,
            y: pos.y,
        });
        let file = MapFile {
            map_size: Size {
                x: self.width(),
                y: self.height(),
            },
            optimal_path: self
                .optimal_path()
                .unwrap_or_default()
                .iter()
                .map(|&dir| dir as u8)
                .collect(),
            map_objects: std::iter::once(player).chain(obstacles).collect(),
            seed: self.seed(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}
