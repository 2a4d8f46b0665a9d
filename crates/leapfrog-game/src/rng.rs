//! The single source of randomness a session uses.
//!
//! Every shuffle and random pick in the rules engine goes through
//! [`GameRng`], which wraps any [`RandomSource`]: an `RngCore` that can be
//! cloned behind a box. Production sessions use `StdRng` seeded from the
//! OS; tests inject a fixed seed or a [`ScriptedSource`] to pin exact
//! outcomes.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{RngCore, SeedableRng};

/// A random generator a `GameState` can own and clone.
pub trait RandomSource: RngCore + Send + Sync + fmt::Debug {
    /// Clones the source, including its current position in the stream.
    fn boxed_clone(&self) -> Box<dyn RandomSource>;
}

impl<R> RandomSource for R
where
    R: RngCore + Clone + Send + Sync + fmt::Debug + 'static,
{
    fn boxed_clone(&self) -> Box<dyn RandomSource> {
        Box::new(self.clone())
    }
}

/// Replays a fixed list of 32-bit words, then yields `0` forever.
///
/// A word of `0` always selects the first element of a slice, so a script
/// of zeros pins every pick to the front.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    words: VecDeque<u32>,
}

impl ScriptedSource {
    pub fn new(words: impl IntoIterator<Item = u32>) -> Self {
        Self {
            words: words.into_iter().collect(),
        }
    }
}

impl RngCore for ScriptedSource {
    fn next_u32(&mut self) -> u32 {
        self.words.pop_front().unwrap_or(0)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_u32());
        let hi = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let word = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}

/// The random-number handle owned by a `GameState`.
pub struct GameRng(Box<dyn RandomSource>);

impl GameRng {
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self(Box::new(source))
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Picks one element uniformly. `None` only for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(self)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(self);
    }
}

impl RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.0.fill_bytes(dst);
    }
}

impl Clone for GameRng {
    fn clone(&self) -> Self {
        Self(self.0.boxed_clone())
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl fmt::Debug for GameRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GameRng").field(&self.0).finish()
    }
}
