use serde::{Deserialize, Serialize};

/// Error returned when a [`WorldConfig`] describes an impossible world.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum WorldConfigError {
    #[display("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[display("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[display("gap top range is inverted: min {min} > max {max}")]
    InvertedGapRange { min: f32, max: f32 },
    #[display("floor ({floor}) must lie below the ceiling ({ceiling})")]
    FloorAboveCeiling { floor: f32, ceiling: f32 },
    #[display("agent start height {y} is outside the playable band")]
    AgentOutOfBounds { y: f32 },
    #[display("{field} ({x}) must lie right of the agent body (ends at {agent_right})")]
    ObstacleBehindAgent {
        field: &'static str,
        x: f32,
        agent_right: f32,
    },
}

/// Geometry, speeds and boundaries of the simulated world.
///
/// The y axis grows downwards: `ceiling` is the smallest allowed y, `floor` the largest.
/// All values are in pixels or pixels per tick.
///
/// Missing fields take their [`Default`] values when deserialized, so a config file only
/// needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal position of every agent (agents never move horizontally)
    pub agent_start_x: f32,
    /// Vertical position of every agent at episode start
    pub agent_start_y: f32,
    pub agent_width: f32,
    pub agent_height: f32,
    pub obstacle_width: f32,
    /// Horizontal scroll speed of obstacles
    pub obstacle_speed: f32,
    /// Distance between `gap_top` and `gap_bottom`
    pub gap_height: f32,
    /// Lower bound (inclusive) of the random gap top
    pub gap_top_min: f32,
    /// Upper bound (exclusive) of the random gap top; equal to `gap_top_min` pins the gap
    pub gap_top_max: f32,
    /// Horizontal position of the obstacle present at episode start
    pub first_obstacle_x: f32,
    /// Horizontal position where replacement obstacles appear (the right boundary)
    pub spawn_x: f32,
    pub floor: f32,
    /// Agents are culled once `y - floor_margin >= floor`
    pub floor_margin: f32,
    /// Agents are culled once `y < ceiling`
    pub ceiling: f32,
    pub ground_width: f32,
    pub ground_speed: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            agent_start_x: 230.0,
            agent_start_y: 350.0,
            agent_width: 34.0,
            agent_height: 24.0,
            obstacle_width: 52.0,
            obstacle_speed: 8.0,
            gap_height: 200.0,
            gap_top_min: 50.0,
            gap_top_max: 450.0,
            first_obstacle_x: 700.0,
            spawn_x: 600.0,
            floor: 730.0,
            floor_margin: 10.0,
            ceiling: -50.0,
            ground_width: 336.0,
            ground_speed: 8.0,
        }
    }
}

impl WorldConfig {
    /// Checks that the configuration describes a playable world.
    pub fn validate(&self) -> Result<(), WorldConfigError> {
        let positive = [
            ("agent_width", self.agent_width),
            ("agent_height", self.agent_height),
            ("obstacle_width", self.obstacle_width),
            ("obstacle_speed", self.obstacle_speed),
            ("gap_height", self.gap_height),
            ("ground_width", self.ground_width),
            ("ground_speed", self.ground_speed),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(WorldConfigError::NotPositive { field, value });
            }
        }

        let finite = [
            ("agent_start_x", self.agent_start_x),
            ("agent_start_y", self.agent_start_y),
            ("gap_top_min", self.gap_top_min),
            ("gap_top_max", self.gap_top_max),
            ("first_obstacle_x", self.first_obstacle_x),
            ("spawn_x", self.spawn_x),
            ("floor", self.floor),
            ("floor_margin", self.floor_margin),
            ("ceiling", self.ceiling),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(WorldConfigError::NotFinite { field, value });
            }
        }

        if self.gap_top_min > self.gap_top_max {
            return Err(WorldConfigError::InvertedGapRange {
                min: self.gap_top_min,
                max: self.gap_top_max,
            });
        }

        if self.floor <= self.ceiling {
            return Err(WorldConfigError::FloorAboveCeiling {
                floor: self.floor,
                ceiling: self.ceiling,
            });
        }

        let y = self.agent_start_y;
        if y < self.ceiling || y - self.floor_margin >= self.floor {
            return Err(WorldConfigError::AgentOutOfBounds { y });
        }

        let agent_right = self.agent_start_x + self.agent_width;
        for (field, x) in [
            ("first_obstacle_x", self.first_obstacle_x),
            ("spawn_x", self.spawn_x),
        ] {
            if x < agent_right {
                return Err(WorldConfigError::ObstacleBehindAgent {
                    field,
                    x,
                    agent_right,
                });
            }
        }

        Ok(())
    }
}
