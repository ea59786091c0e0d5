//! Level data and pattern expansion
//!
//! A level document names reusable patterns (lists of relative entity
//! placements) and the origins where each pattern is stamped. Loading expands
//! every placement into positioned entities, in declared order, failing fast on
//! anything it cannot resolve.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, PlatformKind, StarKind};
use crate::consts::{CULL_DISTANCE, FALLOUT_MARGIN};

/// One entry of a pattern: offset from the placement origin plus a kind code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: i64,
}

/// Stamp the named pattern at `(x, y)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub pattern: String,
}

pub type PatternLibrary = BTreeMap<String, Vec<PatternEntry>>;
pub type PlacementList = Vec<Placement>;

/// Patterns and placements for one entity family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityLayout {
    pub patterns: PatternLibrary,
    pub positions: PlacementList,
}

/// Level document as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LevelData {
    /// Reaching above this height completes the level
    pub end_y: f32,
    pub platforms: EntityLayout,
    pub stars: EntityLayout,
    /// Optional override of the culling distance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cull_distance: Option<f32>,
    /// Optional override of the fallout margin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallout_margin: Option<f32>,
}

/// Which entity family a layout describes (for error reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Platforms,
    Stars,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Platforms => write!(f, "Platforms"),
            Layer::Stars => write!(f, "Stars"),
        }
    }
}

/// Malformed or missing level data. Always fatal for run construction.
#[derive(Debug)]
pub enum LevelError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    UnknownPattern { layer: Layer, name: String },
    UnknownKind { layer: Layer, pattern: String, code: i64 },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read level {}: {source}", path.display())
            }
            Self::Parse(e) => write!(f, "malformed level data: {e}"),
            Self::UnknownPattern { layer, name } => {
                write!(f, "{layer}: placement references unknown pattern '{name}'")
            }
            Self::UnknownKind {
                layer,
                pattern,
                code,
            } => write!(f, "{layer}: pattern '{pattern}' has unknown type code {code}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl LevelData {
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Built-in level used when no level file is given
    pub fn demo() -> Result<Self, LevelError> {
        Self::from_json_str(DEMO_LEVEL_JSON)
    }
}

/// A fully expanded level, ready to start a run
#[derive(Debug, Clone)]
pub struct Level {
    /// Entities sorted by id (platforms first, then stars)
    pub entities: Vec<Entity>,
    pub end_y: f32,
    pub cull_distance: f32,
    pub fallout_margin: f32,
}

/// Expand level data into positioned entities
pub fn load_level(data: &LevelData) -> Result<Level, LevelError> {
    let mut next_id = EntityId::PLAYER.0 + 1;
    let mut entities = Vec::new();

    expand_layout(
        &data.platforms,
        Layer::Platforms,
        &mut next_id,
        &mut entities,
        |id, pos, code| PlatformKind::from_code(code).map(|k| Entity::platform(id, pos, k)),
    )?;
    expand_layout(
        &data.stars,
        Layer::Stars,
        &mut next_id,
        &mut entities,
        |id, pos, code| StarKind::from_code(code).map(|k| Entity::star(id, pos, k)),
    )?;

    log::info!(
        "Level loaded: {} entities, end height {}",
        entities.len(),
        data.end_y
    );

    Ok(Level {
        entities,
        end_y: data.end_y,
        cull_distance: data.cull_distance.unwrap_or(CULL_DISTANCE),
        fallout_margin: data.fallout_margin.unwrap_or(FALLOUT_MARGIN),
    })
}

/// Stamp every placement of one layout, in declared order
fn expand_layout<F>(
    layout: &EntityLayout,
    layer: Layer,
    next_id: &mut u32,
    out: &mut Vec<Entity>,
    make: F,
) -> Result<(), LevelError>
where
    F: Fn(EntityId, Vec2, i64) -> Option<Entity>,
{
    for placement in &layout.positions {
        let pattern = layout.patterns.get(&placement.pattern).ok_or_else(|| {
            LevelError::UnknownPattern {
                layer,
                name: placement.pattern.clone(),
            }
        })?;

        let origin = Vec2::new(placement.x, placement.y);
        for entry in pattern {
            let pos = origin + Vec2::new(entry.x, entry.y);
            let entity =
                make(EntityId(*next_id), pos, entry.kind).ok_or_else(|| LevelError::UnknownKind {
                    layer,
                    pattern: placement.pattern.clone(),
                    code: entry.kind,
                })?;
            *next_id += 1;
            out.push(entity);
        }
    }
    Ok(())
}

/// Short two-pattern level: a zig-zag ladder of platforms with stars between
pub const DEMO_LEVEL_JSON: &str = r#"{
  "EndY": 2400,
  "Platforms": {
    "Patterns": {
      "Single": [ { "x": 0, "y": 0, "type": 0 } ],
      "Ladder": [
        { "x": -80, "y": 0, "type": 0 },
        { "x": 80, "y": 90, "type": 0 },
        { "x": -80, "y": 180, "type": 1 },
        { "x": 80, "y": 270, "type": 0 }
      ]
    },
    "Positions": [
      { "x": 160, "y": 60, "pattern": "Single" },
      { "x": 160, "y": 180, "pattern": "Ladder" },
      { "x": 160, "y": 540, "pattern": "Ladder" },
      { "x": 160, "y": 900, "pattern": "Ladder" },
      { "x": 160, "y": 1260, "pattern": "Ladder" },
      { "x": 160, "y": 1620, "pattern": "Ladder" },
      { "x": 160, "y": 1980, "pattern": "Ladder" }
    ]
  },
  "Stars": {
    "Patterns": {
      "Single": [ { "x": 0, "y": 0, "type": 0 } ],
      "Column": [
        { "x": 0, "y": 0, "type": 0 },
        { "x": 0, "y": 60, "type": 0 },
        { "x": 0, "y": 120, "type": 1 }
      ]
    },
    "Positions": [
      { "x": 160, "y": 220, "pattern": "Single" },
      { "x": 160, "y": 600, "pattern": "Column" },
      { "x": 160, "y": 1320, "pattern": "Column" },
      { "x": 160, "y": 2040, "pattern": "Column" }
    ]
  }
}"#;
