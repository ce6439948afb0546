use crate::WorldConfig;

/// Cosmetic ground plane made of two tiles that scroll left and leapfrog each other.
///
/// Has no effect on collisions or fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Scroller {
    y: f32,
    x1: f32,
    x2: f32,
    width: f32,
    velocity: f32,
}

impl Scroller {
    /// Creates a ground scroller resting on the configured floor.
    #[must_use]
    pub fn ground(config: &WorldConfig) -> Self {
        Self::new(config.floor, config.ground_width, config.ground_speed)
    }

    #[must_use]
    pub fn new(y: f32, width: f32, velocity: f32) -> Self {
        Self {
            y,
            x1: 0.0,
            x2: width,
            width,
            velocity,
        }
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn x1(&self) -> f32 {
        self.x1
    }

    #[must_use]
    pub fn x2(&self) -> f32 {
        self.x2
    }

    pub fn advance(&mut self) {
        self.x1 -= self.velocity;
        self.x2 -= self.velocity;
        if self.x1 + self.width < 0.0 {
            self.x1 = self.x2 + self.width;
        }
        if self.x2 + self.width < 0.0 {
            self.x2 = self.x1 + self.width;
        }
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_restores_offset() {
        let mut ground = Scroller::new(730.0, 336.0, 8.0);
        let offset = ground.x2() - ground.x1();
        for _ in 0..(336 / 8) {
            ground.advance();
        }
        assert_eq!(ground.x2() - ground.x1(), offset);
        assert_eq!(ground.x1(), -336.0);
    }

    #[test]
    fn test_tiles_stay_adjacent() {
        let mut ground = Scroller::new(730.0, 336.0, 8.0);
        for _ in 0..1000 {
            ground.advance();
            assert_eq!((ground.x2() - ground.x1()).abs(), 336.0);
            assert!(ground.x1() + 336.0 >= 0.0 || ground.x2() + 336.0 >= 0.0);
        }
    }

    #[test]
    fn test_tile_wraps_after_leaving() {
        let mut ground = Scroller::new(730.0, 336.0, 8.0);
        for _ in 0..43 {
            ground.advance();
        }
        // x1 left the screen at -344 and jumped behind x2 (-8)
        assert_eq!(ground.x1(), 328.0);
        assert_eq!(ground.x2(), -8.0);
    }
}
