//! Clock and random implementations.

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

const TOKEN_LENGTH: usize = 48;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_token(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Replays a fixed cycle of rolls for testing. Tokens are sequential and
/// do not disturb the roll cycle.
#[cfg(test)]
pub struct CyclingRandom {
    rolls: Vec<i32>,
    cursor: std::sync::atomic::AtomicUsize,
    issued: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl CyclingRandom {
    pub fn new(rolls: Vec<i32>) -> Self {
        Self {
            rolls,
            cursor: std::sync::atomic::AtomicUsize::new(0),
            issued: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl RandomPort for CyclingRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        let n = self
            .cursor
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.rolls
            .get(n % self.rolls.len().max(1))
            .copied()
            .unwrap_or(min)
            .clamp(min, max)
    }

    fn gen_token(&self) -> String {
        let n = self
            .issued
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("token-{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_random_stays_in_range() {
        let random = SystemRandom::new();
        for _ in 0..200 {
            let roll = random.gen_range(1, 6);
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn tokens_are_long_and_distinct() {
        let random = SystemRandom::new();
        let a = random.gen_token();
        let b = random.gen_token();
        assert_eq!(a.len(), TOKEN_LENGTH);
        assert_ne!(a, b);
    }

    #[test]
    fn cycling_random_repeats_its_pattern() {
        let random = CyclingRandom::new(vec![6, 1]);
        let rolls: Vec<i32> = (0..4).map(|_| random.gen_range(1, 6)).collect();
        assert_eq!(rolls, vec![6, 1, 6, 1]);
    }
}
