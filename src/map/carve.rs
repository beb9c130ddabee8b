//! Flood-fill carving of the grid into areas.

use std::collections::HashSet;

use rand::Rng;

use crate::hex::Coords;
use crate::lottery::{Lottery, LotteryError};

use super::{Area, HexMap};

/// Computes an area's tier once its shape is final. `seed_distance` is the
/// hex distance from the map origin to the area's first cell.
pub trait TierPolicy {
    fn tier(&self, area: &Area, seed_distance: u32) -> u32;
}

impl<F> TierPolicy for F
where
    F: Fn(&Area, u32) -> u32,
{
    fn tier(&self, area: &Area, seed_distance: u32) -> u32 {
        self(area, seed_distance)
    }
}

/// Tier equals the seed cell's distance from the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceTier;

impl TierPolicy for DistanceTier {
    fn tier(&self, _area: &Area, seed_distance: u32) -> u32 {
        seed_distance
    }
}

/// Insertion-ordered set used for the frontier and growth candidates, so
/// random picks stay reproducible for a given seed.
#[derive(Default)]
struct CandidateSet {
    items: Vec<Coords>,
    members: HashSet<Coords>,
}

impl CandidateSet {
    fn insert(&mut self, coords: Coords) {
        if self.members.insert(coords) {
            self.items.push(coords);
        }
    }

    fn take_random<R: Rng>(&mut self, rng: &mut R) -> Option<Coords> {
        if self.items.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.items.len());
        let coords = self.items.swap_remove(index);
        self.members.remove(&coords);
        Some(coords)
    }
}

/// Partitions every unassigned cell of `map` into areas.
///
/// Area seeds come from a frontier that starts at the origin. Each new area
/// draws its capacity from `sizes` and grows by attaching random unassigned
/// neighbors until it is full or boxed in; its leftover free neighbors then
/// join the frontier. Returns the number of areas created.
pub fn carve_areas<R>(
    map: &mut HexMap,
    sizes: &mut Lottery<usize>,
    policy: &dyn TierPolicy,
    rng: &mut R,
) -> Result<usize, LotteryError>
where
    R: Rng,
{
    let origin = map.origin();
    let mut frontier = CandidateSet::default();
    frontier.insert(origin);
    let mut created = 0;

    while let Some(seed) = frontier.take_random(rng) {
        if map.cell(seed).map_or(true, |cell| cell.is_assigned()) {
            continue;
        }

        let capacity = sizes.draw()?.ok_or(LotteryError::Empty)?.max(1);
        let id = map.create_area(capacity);
        created += 1;
        map.attach(id, seed);

        let mut candidates = CandidateSet::default();
        for neighbor in map.unassigned_neighbors(seed).collect::<Vec<_>>() {
            candidates.insert(neighbor);
        }

        while map.area(id).is_some_and(|area| !area.is_full()) {
            let Some(next) = candidates.take_random(rng) else {
                break;
            };
            if !map.attach(id, next) {
                continue;
            }
            for neighbor in map.unassigned_neighbors(next).collect::<Vec<_>>() {
                candidates.insert(neighbor);
            }
        }

        let Some(area) = map.area(id) else {
            continue;
        };
        let tier = policy.tier(area, origin.distance(seed));
        let border: Vec<Coords> = area
            .cells()
            .iter()
            .flat_map(|&cell| map.unassigned_neighbors(cell))
            .collect();
        tracing::debug!(
            target: "hexworld::map",
            area = id.raw(),
            capacity,
            cells = area.len(),
            tier,
            seed = %seed,
            "map.carve.area"
        );

        if let Some(area) = map.areas.get_mut(&id) {
            area.set_tier(tier);
        }
        for coords in border {
            frontier.insert(coords);
        }
    }

    Ok(created)
}
