//! Weighted lottery with batch (without-replacement) and blacklist draws.
//!
//! Every ticket is materialised as one slot pointing at the block that owns
//! it, so a plain draw is a single uniform index. Removing tickets rebuilds
//! the slot table, which is fine for the ticket counts used by game balance
//! tables.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LotteryError {
    #[error("an entrant must be entered with at least one ticket (got {tickets})")]
    NonPositiveTickets { tickets: usize },
    #[error("a block must span at least one slot (got {size})")]
    InvalidBlock { size: usize },
    #[error("cannot draw from an empty lottery")]
    Empty,
}

/// Contiguous run of slots owned by one entrant, created by one `enter` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<T> {
    entrant: T,
    start: usize,
    size: usize,
}

impl<T> Block<T> {
    pub fn new(entrant: T, start: usize, size: usize) -> Result<Self, LotteryError> {
        if size < 1 {
            return Err(LotteryError::InvalidBlock { size });
        }
        Ok(Self {
            entrant,
            start,
            size,
        })
    }

    pub fn entrant(&self) -> &T {
        &self.entrant
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// One past the last slot of this block.
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

/// Persistable distribution: entry events in order, never the RNG state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryState<T> {
    pub entries: Vec<(T, usize)>,
}

impl<T> Default for LotteryState<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lottery<T> {
    tickets: HashMap<T, usize>,
    blocks: Vec<Block<T>>,
    slots: Vec<usize>,
    rng: ChaCha8Rng,
    batch: Option<Box<Lottery<T>>>,
}

impl<T> Lottery<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    pub fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            tickets: HashMap::new(),
            blocks: Vec::new(),
            slots: Vec::new(),
            rng,
            batch: None,
        }
    }

    /// Rebuilds a lottery from persisted state and gives it a fresh seed, so
    /// a reloaded lottery never replays a recorded sequence.
    pub fn from_state(state: LotteryState<T>) -> Result<Self, LotteryError> {
        let mut lottery = Self::from_entropy();
        lottery.load_state(state)?;
        Ok(lottery)
    }

    pub fn from_state_seeded(state: LotteryState<T>, seed: u64) -> Result<Self, LotteryError> {
        let mut lottery = Self::new(seed);
        lottery.load_state(state)?;
        Ok(lottery)
    }

    fn load_state(&mut self, state: LotteryState<T>) -> Result<(), LotteryError> {
        for (entrant, tickets) in state.entries {
            self.enter(entrant, tickets)?;
        }
        Ok(())
    }

    pub fn state(&self) -> LotteryState<T> {
        LotteryState {
            entries: self
                .blocks
                .iter()
                .map(|block| (block.entrant.clone(), block.size))
                .collect(),
        }
    }

    pub fn enter(&mut self, entrant: T, tickets: usize) -> Result<(), LotteryError> {
        if tickets < 1 {
            return Err(LotteryError::NonPositiveTickets { tickets });
        }
        let block = Block::new(entrant, self.slots.len(), tickets)?;
        self.push_block(block);
        Ok(())
    }

    fn push_block(&mut self, block: Block<T>) {
        let index = self.blocks.len();
        self.slots.reserve(block.size);
        self.slots
            .extend(std::iter::repeat(index).take(block.size));
        *self.tickets.entry(block.entrant.clone()).or_insert(0) += block.size;
        self.blocks.push(block);
    }

    /// Removes up to `tickets` slots of `entrant`, newest blocks first.
    /// Unknown entrants are ignored.
    pub fn remove(&mut self, entrant: &T, tickets: usize) {
        let Some(held) = self.tickets.get(entrant).copied() else {
            return;
        };
        let mut remaining = tickets.min(held);
        if remaining == 0 {
            return;
        }

        let removed = remaining;
        for block in self.blocks.iter_mut().rev() {
            if block.entrant != *entrant {
                continue;
            }
            let take = block.size.min(remaining);
            block.size -= take;
            remaining -= take;
            if remaining == 0 {
                break;
            }
        }

        if held == removed {
            self.tickets.remove(entrant);
        } else if let Some(total) = self.tickets.get_mut(entrant) {
            *total = held - removed;
        }
        self.rebuild();
    }

    pub fn remove_all(&mut self, entrant: &T) {
        let held = self.get_tickets(entrant);
        self.remove(entrant, held);
    }

    fn rebuild(&mut self) {
        self.blocks.retain(|block| block.size > 0);
        self.slots.clear();
        let mut start = 0;
        for (index, block) in self.blocks.iter_mut().enumerate() {
            block.start = start;
            start += block.size;
            self.slots
                .extend(std::iter::repeat(index).take(block.size));
        }
    }

    pub fn clear(&mut self) {
        self.tickets.clear();
        self.blocks.clear();
        self.slots.clear();
        self.batch = None;
    }

    pub fn get_tickets(&self, entrant: &T) -> usize {
        self.tickets.get(entrant).copied().unwrap_or(0)
    }

    pub fn total_tickets(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn blocks(&self) -> &[Block<T>] {
        &self.blocks
    }

    /// Distinct entrants in order of first entry.
    pub fn entrants(&self) -> Vec<T> {
        let mut seen = HashSet::new();
        self.blocks
            .iter()
            .filter(|block| seen.insert(&block.entrant))
            .map(|block| block.entrant.clone())
            .collect()
    }

    pub fn is_batch_drawing(&self) -> bool {
        self.batch.is_some()
    }

    /// Draws one entrant.
    ///
    /// Outside a batch this fails with [`LotteryError::Empty`] when no tickets
    /// exist. Inside a batch the drawn entrant is struck from the snapshot and
    /// `Ok(None)` signals that the snapshot is exhausted.
    pub fn draw(&mut self) -> Result<Option<T>, LotteryError> {
        if let Some(batch) = self.batch.as_mut() {
            if batch.is_empty() {
                return Ok(None);
            }
            let entrant = batch.draw_slot()?;
            batch.remove_all(&entrant);
            return Ok(Some(entrant));
        }
        self.draw_slot().map(Some)
    }

    pub fn draw_many(&mut self, count: usize) -> Result<Vec<Option<T>>, LotteryError> {
        (0..count).map(|_| self.draw()).collect()
    }

    fn draw_slot(&mut self) -> Result<T, LotteryError> {
        if self.slots.is_empty() {
            return Err(LotteryError::Empty);
        }
        let slot = self.rng.gen_range(0..self.slots.len());
        Ok(self.blocks[self.slots[slot]].entrant.clone())
    }

    /// Draws among entrants not in `blacklist`, weighted by their tickets.
    /// Returns `None` when nothing outside the blacklist holds tickets.
    ///
    /// Walks every block, so this is linear in the number of entries.
    pub fn draw_excluding(&mut self, blacklist: &HashSet<T>) -> Option<T> {
        if let Some(batch) = self.batch.as_mut() {
            let entrant = batch.draw_restricted(blacklist)?;
            batch.remove_all(&entrant);
            return Some(entrant);
        }
        self.draw_restricted(blacklist)
    }

    fn draw_restricted(&mut self, blacklist: &HashSet<T>) -> Option<T> {
        let eligible = |block: &&Block<T>| !blacklist.contains(&block.entrant);
        let space: usize = self.blocks.iter().filter(eligible).map(Block::size).sum();
        if space == 0 {
            return None;
        }
        let mut pick = self.rng.gen_range(0..space);
        for block in self.blocks.iter().filter(eligible) {
            if pick < block.size {
                return Some(block.entrant.clone());
            }
            pick -= block.size;
        }
        None
    }

    pub fn start_batch_draw(&mut self) {
        self.start_batch_draw_excluding(&HashSet::new());
    }

    /// Snapshots the distribution minus `blacklist`. Draws until
    /// [`Lottery::end_batch_draw`] come from the snapshot and never repeat.
    pub fn start_batch_draw_excluding(&mut self, blacklist: &HashSet<T>) {
        let seed = self.rng.gen::<u64>();
        let mut snapshot = Lottery::new(seed);
        for block in self
            .blocks
            .iter()
            .filter(|block| !blacklist.contains(&block.entrant))
        {
            snapshot.push_block(Block {
                entrant: block.entrant.clone(),
                start: snapshot.slots.len(),
                size: block.size,
            });
        }
        self.batch = Some(Box::new(snapshot));
    }

    pub fn end_batch_draw(&mut self) {
        self.batch = None;
    }

    /// Reseeds the generator; `None` pulls a seed from OS entropy.
    pub fn change_seed(&mut self, seed: Option<u64>) {
        self.rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
    }

    /// Adds this lottery's tickets to `target`. Existing totals accumulate.
    pub fn combine_into(&self, target: &mut Lottery<T>) {
        for block in &self.blocks {
            target.push_block(Block {
                entrant: block.entrant.clone(),
                start: target.slots.len(),
                size: block.size,
            });
        }
    }

    /// Adds `other`'s tickets to this lottery.
    pub fn combine_with(&mut self, other: &Lottery<T>) {
        other.combine_into(self);
    }
}

impl<T> Default for Lottery<T>
where
    T: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seed: u64) -> Lottery<&'static str> {
        let mut lottery = Lottery::new(seed);
        lottery.enter("a", 1).unwrap();
        lottery.enter("b", 3).unwrap();
        lottery.enter("c", 2).unwrap();
        lottery
    }

    #[test]
    fn enter_rejects_zero_tickets() {
        let mut lottery = Lottery::new(1);
        assert_eq!(
            lottery.enter("x", 0),
            Err(LotteryError::NonPositiveTickets { tickets: 0 })
        );
        assert!(lottery.is_empty());
    }

    #[test]
    fn block_rejects_zero_size() {
        assert_eq!(
            Block::new("x", 0, 0).unwrap_err(),
            LotteryError::InvalidBlock { size: 0 }
        );
    }

    #[test]
    fn partial_remove_keeps_remainder() {
        let mut lottery = Lottery::new(1);
        lottery.enter("x", 5).unwrap();
        lottery.remove(&"x", 2);
        assert_eq!(lottery.get_tickets(&"x"), 3);
        assert_eq!(lottery.total_tickets(), 3);
    }

    #[test]
    fn remove_works_from_newest_block_backward() {
        let mut lottery = Lottery::new(1);
        lottery.enter("x", 2).unwrap();
        lottery.enter("y", 1).unwrap();
        lottery.enter("x", 3).unwrap();

        lottery.remove(&"x", 4);

        let blocks: Vec<_> = lottery
            .blocks()
            .iter()
            .map(|b| (*b.entrant(), b.start(), b.size()))
            .collect();
        assert_eq!(blocks, vec![("x", 0, 1), ("y", 1, 1)]);
        assert_eq!(lottery.get_tickets(&"x"), 1);
    }

    #[test]
    fn remove_unknown_entrant_is_noop() {
        let mut lottery = sample(3);
        lottery.remove(&"zzz", 10);
        assert_eq!(lottery.total_tickets(), 6);
    }

    #[test]
    fn remove_more_than_held_clears_entrant() {
        let mut lottery = sample(3);
        lottery.remove(&"b", 100);
        assert_eq!(lottery.get_tickets(&"b"), 0);
        assert_eq!(lottery.total_tickets(), 3);
        assert_eq!(lottery.entrants(), vec!["a", "c"]);
    }

    #[test]
    fn draw_from_empty_is_an_error() {
        let mut lottery: Lottery<u32> = Lottery::new(1);
        assert_eq!(lottery.draw(), Err(LotteryError::Empty));
    }

    #[test]
    fn draw_is_weighted_by_tickets() {
        let mut lottery = Lottery::new(11);
        lottery.enter('A', 1).unwrap();
        lottery.enter('B', 3).unwrap();

        let mut a = 0_u32;
        let mut b = 0_u32;
        for _ in 0..100_000 {
            match lottery.draw().unwrap() {
                Some('A') => a += 1,
                Some('B') => b += 1,
                other => panic!("unexpected draw {other:?}"),
            }
        }
        let ratio = f64::from(b) / f64::from(a);
        assert!((2.8..3.2).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn draw_many_returns_exact_count() {
        let mut lottery = sample(5);
        let draws = lottery.draw_many(17).unwrap();
        assert_eq!(draws.len(), 17);
        assert!(draws.iter().all(Option::is_some));
    }

    #[test]
    fn batch_draw_never_repeats_and_leaves_original_intact() {
        let mut lottery = sample(21);
        lottery.start_batch_draw();
        let mut drawn = Vec::new();
        for _ in 0..3 {
            drawn.push(lottery.draw().unwrap().unwrap());
        }
        assert_eq!(lottery.draw().unwrap(), None, "batch should be exhausted");
        lottery.end_batch_draw();

        drawn.sort();
        assert_eq!(drawn, vec!["a", "b", "c"]);
        assert_eq!(lottery.get_tickets(&"a"), 1);
        assert_eq!(lottery.get_tickets(&"b"), 3);
        assert_eq!(lottery.get_tickets(&"c"), 2);
        assert!(!lottery.is_batch_drawing());
    }

    #[test]
    fn batch_draw_on_empty_lottery_is_soft() {
        let mut lottery: Lottery<u8> = Lottery::new(2);
        lottery.start_batch_draw();
        assert_eq!(lottery.draw(), Ok(None));
    }

    #[test]
    fn batch_draw_excluding_skips_blacklist() {
        let mut lottery = sample(8);
        let blacklist: HashSet<_> = ["b"].into_iter().collect();
        lottery.start_batch_draw_excluding(&blacklist);
        let drawn: Vec<_> = lottery.draw_many(3).unwrap();
        lottery.end_batch_draw();

        assert!(!drawn.contains(&Some("b")));
        assert_eq!(drawn.iter().filter(|d| d.is_none()).count(), 1);
    }

    #[test]
    fn blacklist_draw_excludes_members() {
        let mut lottery = sample(4);
        let blacklist: HashSet<_> = ["a", "b"].into_iter().collect();
        for _ in 0..200 {
            assert_eq!(lottery.draw_excluding(&blacklist), Some("c"));
        }
    }

    #[test]
    fn blacklist_covering_everything_returns_none() {
        let mut lottery = sample(4);
        let blacklist: HashSet<_> = ["a", "b", "c"].into_iter().collect();
        assert_eq!(lottery.draw_excluding(&blacklist), None);
    }

    #[test]
    fn change_seed_makes_draws_reproducible() {
        let mut first = sample(1);
        let mut second = sample(2);
        first.change_seed(Some(77));
        second.change_seed(Some(77));
        assert_eq!(first.draw_many(20).unwrap(), second.draw_many(20).unwrap());
    }

    #[test]
    fn combine_adds_totals() {
        let source = sample(1);
        let mut target = Lottery::new(2);
        target.enter("b", 4).unwrap();
        source.combine_into(&mut target);

        assert_eq!(target.get_tickets(&"a"), 1);
        assert_eq!(target.get_tickets(&"b"), 7);
        assert_eq!(target.total_tickets(), 10);

        let mut merged = Lottery::new(3);
        merged.combine_with(&source);
        assert_eq!(merged.total_tickets(), source.total_tickets());
    }

    #[test]
    fn state_round_trips_distribution() {
        let mut lottery = sample(9);
        lottery.remove(&"b", 1);
        let restored = Lottery::from_state_seeded(lottery.state(), 5).unwrap();
        assert_eq!(restored.state(), lottery.state());
        assert_eq!(restored.get_tickets(&"b"), 2);
    }

    #[test]
    fn from_state_rejects_zero_entries() {
        let state = LotteryState {
            entries: vec![("x", 0)],
        };
        assert!(Lottery::from_state(state).is_err());
    }
}
