use crate::WorldConfig;

/// Vertical velocity set by [`Agent::apply_impulse`] (negative is upwards).
pub const IMPULSE_VELOCITY: f32 = -10.5;
/// Downward acceleration used by the displacement formula.
pub const GRAVITY: f32 = 3.0;
/// Maximum absolute displacement per tick, before the rising boost.
pub const TERMINAL_DISPLACEMENT: f32 = 16.0;
/// Extra upward displacement applied on every rising tick.
pub const RISE_BOOST: f32 = 2.0;
/// Tilt (degrees) while rising or close to the impulse point.
pub const MAX_TILT: f32 = 25.0;
/// Lowest tilt (degrees), reached during a long fall.
pub const MIN_TILT: f32 = -90.0;
/// Degrees the tilt drops per falling tick.
pub const TILT_SPEED: f32 = 20.0;
/// An agent within this distance below its impulse point keeps its nose up.
const TILT_HOLD_DISTANCE: f32 = 50.0;

/// Physical state of a single bird.
///
/// Agents only move vertically; the world scrolls past them. The agent does not know
/// about fitness or liveness, which are bookkept by the episode evaluator.
///
/// # Example
///
/// ```
/// use flapevo_engine::{Agent, WorldConfig};
///
/// let mut agent = Agent::new(&WorldConfig::default());
/// agent.apply_impulse();
/// agent.advance();
/// assert!(agent.y() < 350.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    vertical_velocity: f32,
    tilt: f32,
    ticks_since_impulse: u32,
    impulse_height: f32,
}

impl Agent {
    /// Creates an agent at the configured start position, at rest.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self::at(
            config.agent_start_x,
            config.agent_start_y,
            config.agent_width,
            config.agent_height,
        )
    }

    /// Creates an agent at an explicit position with the given body size.
    #[must_use]
    pub fn at(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            vertical_velocity: 0.0,
            tilt: 0.0,
            ticks_since_impulse: 0,
            impulse_height: y,
        }
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[must_use]
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Returns the visual tilt in degrees, within [`MIN_TILT`]..=[`MAX_TILT`].
    #[must_use]
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    #[must_use]
    pub fn ticks_since_impulse(&self) -> u32 {
        self.ticks_since_impulse
    }

    /// Makes the agent jump.
    ///
    /// The jump takes effect on the next [`Self::advance`].
    pub fn apply_impulse(&mut self) {
        self.vertical_velocity = IMPULSE_VELOCITY;
        self.ticks_since_impulse = 0;
        self.impulse_height = self.y;
    }

    /// Integrates one tick of motion and returns the applied displacement.
    ///
    /// ```text
    /// t = ticks since impulse (after increment)
    /// d = v·t + ½·GRAVITY·t²,  clamped to ±TERMINAL_DISPLACEMENT
    /// d -= RISE_BOOST          when rising
    /// ```
    ///
    /// The rising boost makes the agent climb faster than it falls. The clamp also caps the
    /// climb: ticks 3 and 4 of a jump would move 18 px up and are held to 16 before the boost.
    pub fn advance(&mut self) -> f32 {
        self.ticks_since_impulse += 1;
        #[expect(clippy::cast_precision_loss)]
        let t = self.ticks_since_impulse as f32;

        let mut displacement = self.vertical_velocity * t + 0.5 * GRAVITY * t * t;
        if displacement.abs() > TERMINAL_DISPLACEMENT {
            displacement = TERMINAL_DISPLACEMENT.copysign(displacement);
        }
        if displacement < 0.0 {
            displacement -= RISE_BOOST;
        }
        self.y += displacement;

        if displacement < 0.0 || self.y < self.impulse_height + TILT_HOLD_DISTANCE {
            self.tilt = self.tilt.max(MAX_TILT);
        } else {
            self.tilt = (self.tilt - TILT_SPEED).max(MIN_TILT);
        }

        displacement
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent::at(230.0, 350.0, 34.0, 24.0)
    }

    #[test]
    fn test_free_fall_from_rest() {
        let mut agent = agent();
        let displacements: Vec<f32> = (0..6).map(|_| agent.advance()).collect();
        // 1.5·t² until the terminal clamp kicks in at t = 4
        assert_eq!(displacements, [1.5, 6.0, 13.5, 16.0, 16.0, 16.0]);
        assert_eq!(agent.y(), 350.0 + 1.5 + 6.0 + 13.5 + 16.0 * 3.0);
    }

    #[test]
    fn test_jump_trajectory() {
        let mut agent = agent();
        agent.apply_impulse();
        assert_eq!(agent.vertical_velocity(), IMPULSE_VELOCITY);
        assert_eq!(agent.ticks_since_impulse(), 0);

        let displacements: Vec<f32> = (0..9).map(|_| agent.advance()).collect();
        assert_eq!(
            displacements,
            [-11.0, -17.0, -18.0, -18.0, -17.0, -11.0, 0.0, 12.0, 16.0]
        );
    }

    #[test]
    fn test_rising_displacement_is_clamped() {
        let mut agent = agent();
        agent.apply_impulse();
        agent.advance();
        agent.advance();
        // unclamped d = -18 at t = 3 and t = 4
        assert_eq!(agent.advance(), -(TERMINAL_DISPLACEMENT + RISE_BOOST));
        assert_eq!(agent.advance(), -(TERMINAL_DISPLACEMENT + RISE_BOOST));
    }

    #[test]
    fn test_jump_then_fall_is_repeatable() {
        // Two agents that jump at different heights follow the same relative trajectory
        let mut a = agent();
        let mut b = Agent::at(230.0, 500.0, 34.0, 24.0);
        a.apply_impulse();
        b.apply_impulse();
        for _ in 0..20 {
            let da = a.advance();
            let db = b.advance();
            assert_eq!(da, db);
            assert!(da.abs() <= TERMINAL_DISPLACEMENT + RISE_BOOST);
        }
        assert_eq!(b.y() - a.y(), 150.0);
    }

    #[test]
    fn test_climb_and_fall_back_balances() {
        // The 13-tick jump arc ends exactly where it started
        let mut agent = agent();
        agent.apply_impulse();
        let total: f32 = (0..13).map(|_| agent.advance()).sum();
        assert_eq!(total, 0.0);
        assert_eq!(agent.y(), 350.0);
    }

    #[test]
    fn test_displacement_is_clamped_for_long_falls() {
        let mut agent = agent();
        for _ in 0..200 {
            let d = agent.advance();
            assert!(d <= TERMINAL_DISPLACEMENT);
        }
    }

    #[test]
    fn test_tilt_rises_on_jump_and_falls_to_floor() {
        let mut agent = agent();
        agent.apply_impulse();
        agent.advance();
        assert_eq!(agent.tilt(), MAX_TILT);

        for _ in 0..100 {
            agent.advance();
            assert!((MIN_TILT..=MAX_TILT).contains(&agent.tilt()));
        }
        assert_eq!(agent.tilt(), MIN_TILT);
    }

    #[test]
    fn test_tilt_holds_near_impulse_point() {
        let mut agent = agent();
        // Falling from rest: displacement is positive but still within the hold distance
        agent.advance();
        assert_eq!(agent.tilt(), MAX_TILT);
    }
}
