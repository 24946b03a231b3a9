//! Player identification and per-seat data storage.
//!
//! ## PlayerId
//!
//! Stable string identifier chosen by the session layer. Unique per game and
//! carried verbatim on the wire.
//!
//! ## Seat
//!
//! 0-based position of a participant in the game, assigned in the order ids
//! were passed to `StartGame`. Seat order is the canonical iteration order
//! for dealing, reveal and resolution.
//!
//! ## PlayerMap
//!
//! Per-seat data storage backed by `Vec` for O(1) access.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Stable participant identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a new player ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Seat index of a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat(pub u8);

impl Seat {
    /// Create a new seat.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other seat in a two-seat game.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Iterate over all seats for a game with `count` participants.
    ///
    /// ```
    /// use duel_ccg::core::Seat;
    ///
    /// let seats: Vec<_> = Seat::all(2).collect();
    /// assert_eq!(seats, vec![Seat::new(0), Seat::new(1)]);
    /// ```
    pub fn all(count: usize) -> impl Iterator<Item = Seat> {
        (0..count as u8).map(Seat)
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use duel_ccg::core::{PlayerMap, Seat};
///
/// let mut score: PlayerMap<u32> = PlayerMap::new(2, |_| 0);
/// score[Seat::new(1)] += 4;
/// assert_eq!(score[Seat::new(1)], 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(count: usize, factory: impl Fn(Seat) -> T) -> Self {
        let data = (0..count as u8).map(|i| factory(Seat(i))).collect();
        Self { data }
    }

    /// Build from values already in seat order.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Get the number of seats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the map has no seats.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a reference to a seat's data.
    #[must_use]
    pub fn get(&self, seat: Seat) -> &T {
        &self.data[seat.index()]
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.data[seat.index()]
    }

    /// Borrow two distinct seats mutably at once.
    ///
    /// Panics if `a == b`.
    pub fn pair_mut(&mut self, a: Seat, b: Seat) -> (&mut T, &mut T) {
        assert_ne!(a, b, "pair_mut requires two distinct seats");
        if a.index() < b.index() {
            let (lo, hi) = self.data.split_at_mut(b.index());
            (&mut lo[a.index()], &mut hi[0])
        } else {
            let (lo, hi) = self.data.split_at_mut(a.index());
            (&mut hi[0], &mut lo[b.index()])
        }
    }

    /// Iterate over (Seat, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (Seat(i as u8), v))
    }

    /// Iterate over (Seat, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Seat, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (Seat(i as u8), v))
    }

    /// Iterate over values in seat order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterate over all seats.
    pub fn seats(&self) -> impl Iterator<Item = Seat> {
        (0..self.data.len() as u8).map(Seat)
    }
}

impl<T> Index<Seat> for PlayerMap<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &Self::Output {
        self.get(seat)
    }
}

impl<T> IndexMut<Seat> for PlayerMap<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        self.get_mut(seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display_and_serde() {
        let id = PlayerId::new("host");
        assert_eq!(id.to_string(), "host");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"host\"");
    }

    #[test]
    fn test_seat_opponent() {
        assert_eq!(Seat::new(0).opponent(), Seat::new(1));
        assert_eq!(Seat::new(1).opponent(), Seat::new(0));
        assert_eq!(format!("{}", Seat::new(1)), "Seat 1");
    }

    #[test]
    fn test_player_map_new() {
        let map: PlayerMap<usize> = PlayerMap::new(2, |s| s.index() * 10);
        assert_eq!(map[Seat::new(0)], 0);
        assert_eq!(map[Seat::new(1)], 10);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let mut map = PlayerMap::from_vec(vec![1, 2]);

        let (a, b) = map.pair_mut(Seat::new(0), Seat::new(1));
        *a += 10;
        *b += 20;
        assert_eq!(map[Seat::new(0)], 11);
        assert_eq!(map[Seat::new(1)], 22);

        let (b, a) = map.pair_mut(Seat::new(1), Seat::new(0));
        assert_eq!((*a, *b), (11, 22));
    }

    #[test]
    #[should_panic(expected = "two distinct seats")]
    fn test_pair_mut_same_seat_panics() {
        let mut map = PlayerMap::from_vec(vec![1, 2]);
        let _ = map.pair_mut(Seat::new(0), Seat::new(0));
    }

    #[test]
    fn test_iteration_order() {
        let map = PlayerMap::from_vec(vec!["a", "b"]);
        let seats: Vec<_> = map.iter().map(|(s, v)| (s.index(), *v)).collect();
        assert_eq!(seats, vec![(0, "a"), (1, "b")]);
    }
}
