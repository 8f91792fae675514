//! Level layout: stacked sections drawn from template pools
//!
//! The first section comes from the start pool and owns every spawn point.
//! Middle sections come from the general pool, the last one from the end
//! pool when one is configured. Sections stack without gaps.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_RESAMPLE_ATTEMPTS;

const BUILTIN_SECTIONS: &str = include_str!("../../data/sections.json");

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("section pool `{0}` has no templates")]
    EmptyPool(&'static str),
    #[error("a level needs at least one section")]
    NoSections,
    #[error("section template `{name}` has invalid height {height}")]
    BadHeight { name: String, height: f32 },
    #[error("start section `{0}` has no player spawn points")]
    NoSpawnPoints(String),
    #[error("failed to parse section database: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where a player may enter the level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Position relative to the section origin
    pub position: Vec3,
    /// Facing, radians around +Y
    #[serde(default)]
    pub yaw: f32,
}

/// Authored chunk of level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTemplate {
    pub name: String,
    pub height: f32,
    #[serde(default = "default_section_width")]
    pub width: f32,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPoint>,
}

fn default_section_width() -> f32 {
    20.0
}

/// The three template pools a level is drawn from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionDatabase {
    pub start: Vec<SectionTemplate>,
    pub general: Vec<SectionTemplate>,
    /// Optional closing sections; empty means "use the general pool"
    #[serde(default)]
    pub end: Vec<SectionTemplate>,
}

impl SectionDatabase {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let db: Self = serde_json::from_str(json)?;
        db.validate()?;
        Ok(db)
    }

    /// Templates shipped with the crate
    pub fn builtin() -> Result<Self, LayoutError> {
        Self::from_json(BUILTIN_SECTIONS)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.start.is_empty() {
            return Err(LayoutError::EmptyPool("start"));
        }
        if self.general.is_empty() {
            return Err(LayoutError::EmptyPool("general"));
        }
        for template in self.start.iter().chain(&self.general).chain(&self.end) {
            if !(template.height.is_finite() && template.height > 0.0) {
                return Err(LayoutError::BadHeight {
                    name: template.name.clone(),
                    height: template.height,
                });
            }
        }
        if let Some(empty) = self.start.iter().find(|t| t.spawn_points.is_empty()) {
            return Err(LayoutError::NoSpawnPoints(empty.name.clone()));
        }
        Ok(())
    }
}

/// A template instantiated at a vertical offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSection {
    pub template: String,
    pub origin_y: f32,
    pub height: f32,
    pub width: f32,
}

impl PlacedSection {
    pub fn top(&self) -> f32 {
        self.origin_y + self.height
    }
}

/// Ordered, gap-free stack of sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub sections: Vec<PlacedSection>,
}

impl LevelLayout {
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn total_height(&self) -> f32 {
        self.sections.last().map(PlacedSection::top).unwrap_or(0.0)
    }

    pub fn template_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.template.as_str()).collect()
    }

    /// Index of the section containing height `y`.
    ///
    /// Below the level maps to 0, above it to the last section.
    pub fn section_index_at(&self, y: f32) -> Option<usize> {
        if self.sections.is_empty() {
            return None;
        }
        let index = self
            .sections
            .iter()
            .position(|s| y < s.top())
            .unwrap_or(self.sections.len() - 1);
        Some(index)
    }

    /// Wrap `x` across the start section's side walls
    pub fn wrap_x(&self, x: f32) -> f32 {
        let Some(start) = self.sections.first() else {
            return x;
        };
        let half = start.width * 0.5;
        if x < -half {
            half - 0.1
        } else if x > half {
            -half + 0.1
        } else {
            x
        }
    }
}

/// Builds layouts and hands out spawn points
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    database: SectionDatabase,
    rng: Pcg32,
    layout: LevelLayout,
    unused_spawn_points: Vec<SpawnPoint>,
}

impl LevelGenerator {
    pub fn new(database: SectionDatabase, seed: u64) -> Result<Self, LayoutError> {
        database.validate()?;
        Ok(Self {
            database,
            rng: Pcg32::seed_from_u64(seed),
            layout: LevelLayout::default(),
            unused_spawn_points: Vec::new(),
        })
    }

    pub fn database(&self) -> &SectionDatabase {
        &self.database
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn remaining_spawn_points(&self) -> usize {
        self.unused_spawn_points.len()
    }

    /// Tear down the current level (no-op when none exists)
    pub fn destroy(&mut self) {
        self.layout.sections.clear();
        self.unused_spawn_points.clear();
    }

    /// Replace the current level with a fresh one of `section_count` sections
    pub fn generate(&mut self, section_count: usize) -> Result<&LevelLayout, LayoutError> {
        if section_count == 0 {
            return Err(LayoutError::NoSections);
        }
        self.destroy();

        let db = &self.database;
        let rng = &mut self.rng;
        let mut next_origin = 0.0;
        let mut sections: Vec<PlacedSection> = Vec::with_capacity(section_count);

        let start_index = pick_template(rng, &db.start, None)?;
        let start = &db.start[start_index];
        self.unused_spawn_points = start
            .spawn_points
            .iter()
            .map(|sp| SpawnPoint {
                position: sp.position + Vec3::new(0.0, next_origin, 0.0),
                yaw: sp.yaw,
            })
            .collect();
        sections.push(place(start, &mut next_origin));

        for slot in 1..section_count {
            let is_last = slot + 1 == section_count;
            let pool = if is_last && !db.end.is_empty() {
                &db.end
            } else {
                &db.general
            };
            let previous = sections.last().map(|s| s.template.as_str());
            let index = pick_template(rng, pool, previous)?;
            sections.push(place(&pool[index], &mut next_origin));
        }

        log::info!(
            "Generated level: {} sections, {:.1} tall [{}]",
            sections.len(),
            next_origin,
            sections
                .iter()
                .map(|s| s.template.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.layout = LevelLayout { sections };
        Ok(&self.layout)
    }

    /// Take a random unused spawn point from the start section
    pub fn pick_spawn_point(&mut self) -> Option<SpawnPoint> {
        if self.unused_spawn_points.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.unused_spawn_points.len());
        Some(self.unused_spawn_points.swap_remove(index))
    }
}

fn place(template: &SectionTemplate, next_origin: &mut f32) -> PlacedSection {
    let placed = PlacedSection {
        template: template.name.clone(),
        origin_y: *next_origin,
        height: template.height,
        width: template.width,
    };
    *next_origin += template.height;
    placed
}

/// Random template index, re-rolled to avoid repeating `previous`
fn pick_template(
    rng: &mut Pcg32,
    pool: &[SectionTemplate],
    previous: Option<&str>,
) -> Result<usize, LayoutError> {
    if pool.is_empty() {
        return Err(LayoutError::EmptyPool("section"));
    }

    let mut index = rng.random_range(0..pool.len());
    let Some(previous) = previous else {
        return Ok(index);
    };

    let mut attempts = 0;
    while pool[index].name == previous {
        if attempts >= MAX_RESAMPLE_ATTEMPTS {
            log::debug!("Resample limit hit, repeating section `{}`", previous);
            break;
        }
        index = rng.random_range(0..pool.len());
        attempts += 1;
    }
    Ok(index)
}
