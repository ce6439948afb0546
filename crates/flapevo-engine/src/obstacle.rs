use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{Agent, WorldConfig, WorldSeed};

/// A scrolling barrier with a passable vertical gap.
///
/// The obstacle is solid above `gap_top` and below `gap_bottom` over its whole width.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    x: f32,
    gap_top: f32,
    gap_bottom: f32,
    width: f32,
    speed: f32,
    passed: bool,
}

impl Obstacle {
    /// Creates an obstacle with an explicit gap.
    #[must_use]
    pub fn new(x: f32, gap_top: f32, gap_height: f32, width: f32, speed: f32) -> Self {
        Self {
            x,
            gap_top,
            gap_bottom: gap_top + gap_height,
            width,
            speed,
            passed: false,
        }
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn gap_top(&self) -> f32 {
        self.gap_top
    }

    #[must_use]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_bottom
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns whether the lead agent has already flown past this obstacle.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.passed
    }

    pub fn mark_passed(&mut self) {
        self.passed = true;
    }

    /// Returns whether the obstacle has fully scrolled past the left edge of the world.
    #[must_use]
    pub fn is_offscreen(&self) -> bool {
        self.x + self.width < 0.0
    }

    /// Scrolls the obstacle one tick to the left.
    pub fn advance(&mut self) {
        self.x -= self.speed;
    }

    /// Returns whether the agent is hitting the solid part of this obstacle.
    ///
    /// The agent's body must overlap the obstacle horizontally, and the agent's vertical
    /// position must be strictly outside `[gap_top, gap_bottom]`.
    #[must_use]
    pub fn overlaps(&self, agent: &Agent) -> bool {
        let horizontal = agent.x() < self.x + self.width && agent.x() + agent.width() > self.x;
        let outside_gap = agent.y() < self.gap_top || agent.y() > self.gap_bottom;
        horizontal && outside_gap
    }
}

/// Seeded source of obstacles.
///
/// Every spawned obstacle draws its `gap_top` uniformly from
/// `[gap_top_min, gap_top_max)`, rounded down to a whole pixel. A zero-width range pins
/// every gap to `gap_top_min`.
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    rng: Pcg32,
    gap_top_min: f32,
    gap_top_max: f32,
    gap_height: f32,
    width: f32,
    speed: f32,
}

impl ObstacleSpawner {
    #[must_use]
    pub fn new(config: &WorldConfig, seed: WorldSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.to_bytes()),
            gap_top_min: config.gap_top_min,
            gap_top_max: config.gap_top_max,
            gap_height: config.gap_height,
            width: config.obstacle_width,
            speed: config.obstacle_speed,
        }
    }

    /// Spawns a new obstacle at horizontal position `x`.
    ///
    /// Gap tops are whole pixels, which keeps `gap_bottom - gap_top` exactly `gap_height`.
    pub fn spawn(&mut self, x: f32) -> Obstacle {
        let gap_top = if self.gap_top_max > self.gap_top_min {
            self.rng
                .random_range(self.gap_top_min..self.gap_top_max)
                .floor()
                .max(self.gap_top_min)
        } else {
            self.gap_top_min
        };
        Obstacle::new(x, gap_top, self.gap_height, self.width, self.speed)
    }
}
