use std::fmt::Write as _;

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for the obstacle gap stream.
///
/// Obstacle placement is random, but two episodes created with the same seed see
/// the same sequence of gaps. Serialized as a 32-character hex string so that seeds can be
/// copied between log output and config files.
///
/// # Example
///
/// ```
/// use flapevo_engine::WorldSeed;
/// use rand::Rng as _;
///
/// let random: WorldSeed = rand::rng().random();
/// let fixed = WorldSeed::from(7);
/// # let _ = (random, fixed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSeed([u8; 16]);

impl WorldSeed {
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl From<u64> for WorldSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl Serialize for WorldSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for WorldSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid seed: expected 32 hex characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid seed: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<WorldSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> WorldSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        WorldSeed(seed)
    }
}
