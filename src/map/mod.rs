//! Hex map arena: cells keyed by coordinates, areas keyed by id.
//!
//! Cells refer to their area by [`AreaId`] only; the map owns both sides of
//! the relation and keeps them consistent.

mod area;
mod carve;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::biome::BiomeType;
use crate::hex::{Coords, HexDirection};

pub use area::{Area, AreaId, MergeTierPolicy};
pub use carve::{carve_areas, DistanceTier, TierPolicy};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("unknown area {0}")]
    UnknownArea(AreaId),
    #[error("cannot merge fewer than two areas")]
    NothingToMerge,
    #[error("area {0} has no tier")]
    Untiered(AreaId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexCell {
    coords: Coords,
    area: Option<AreaId>,
}

impl HexCell {
    fn new(coords: Coords) -> Self {
        Self { coords, area: None }
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn area(&self) -> Option<AreaId> {
        self.area
    }

    pub fn is_assigned(&self) -> bool {
        self.area.is_some()
    }
}

/// A cell together with whichever of its six neighbors exist on the map.
#[derive(Debug, Clone, Copy)]
pub struct Neighbors<'a> {
    center: &'a HexCell,
    slots: [Option<&'a HexCell>; 6],
}

impl<'a> Neighbors<'a> {
    pub fn center(&self) -> &'a HexCell {
        self.center
    }

    pub fn get(&self, direction: HexDirection) -> Option<&'a HexCell> {
        self.slots[direction.index()]
    }

    pub fn existing(&self) -> impl Iterator<Item = &'a HexCell> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

#[derive(Debug, Clone)]
pub struct HexMap {
    radius: u32,
    cells: BTreeMap<Coords, HexCell>,
    areas: BTreeMap<AreaId, Area>,
    next_area: u64,
}

impl HexMap {
    /// Creates every cell within `radius` of the origin, ring by ring.
    pub fn new(radius: u32) -> Self {
        let mut cells = BTreeMap::new();
        for ring in 0..=radius {
            for coords in Coords::ORIGIN.ring(ring) {
                cells.insert(coords, HexCell::new(coords));
            }
        }
        Self {
            radius,
            cells,
            areas: BTreeMap::new(),
            next_area: 0,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn origin(&self) -> Coords {
        Coords::ORIGIN
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, coords: Coords) -> bool {
        self.cells.contains_key(&coords)
    }

    pub fn cell(&self, coords: Coords) -> Option<&HexCell> {
        self.cells.get(&coords)
    }

    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.values()
    }

    pub fn neighbors(&self, coords: Coords) -> Option<Neighbors<'_>> {
        let center = self.cells.get(&coords)?;
        let slots = coords.neighbors().map(|neighbor| self.cells.get(&neighbor));
        Some(Neighbors { center, slots })
    }

    /// Neighbor coordinates of `coords` that exist and have no area yet.
    pub fn unassigned_neighbors(&self, coords: Coords) -> impl Iterator<Item = Coords> + '_ {
        coords.neighbors().into_iter().filter(move |neighbor| {
            self.cells
                .get(neighbor)
                .is_some_and(|cell| !cell.is_assigned())
        })
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(&id)
    }

    pub fn area_of(&self, coords: Coords) -> Option<&Area> {
        let id = self.cells.get(&coords)?.area?;
        self.areas.get(&id)
    }

    /// Areas in id order.
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    pub fn area_ids(&self) -> Vec<AreaId> {
        self.areas.keys().copied().collect()
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub(crate) fn create_area(&mut self, capacity: usize) -> AreaId {
        let id = self.allocate();
        self.areas.insert(id, Area::new(id, capacity));
        id
    }

    /// Puts `coords` into area `id`. Returns `false` without changing
    /// anything if the area is full, the cell is taken, or either is unknown.
    pub(crate) fn attach(&mut self, id: AreaId, coords: Coords) -> bool {
        let Some(cell) = self.cells.get_mut(&coords) else {
            return false;
        };
        if cell.area.is_some() {
            return false;
        }
        let Some(area) = self.areas.get_mut(&id) else {
            return false;
        };
        if !area.push_cell(coords) {
            return false;
        }
        cell.area = Some(id);
        true
    }

    pub fn set_tier(&mut self, id: AreaId, tier: u32) -> Result<(), MapError> {
        self.areas
            .get_mut(&id)
            .ok_or(MapError::UnknownArea(id))?
            .set_tier(tier);
        Ok(())
    }

    pub fn set_biome(&mut self, id: AreaId, biome: BiomeType) -> Result<(), MapError> {
        self.areas
            .get_mut(&id)
            .ok_or(MapError::UnknownArea(id))?
            .set_biome(biome);
        Ok(())
    }

    /// Replaces `ids` with one new area holding all of their cells, in the
    /// given order. Capacity is the sum of the parts and the tier follows
    /// `policy`. Cells are re-parented to the new area. Every part must
    /// already carry a tier; nothing changes on error.
    pub fn merge_areas(
        &mut self,
        ids: &[AreaId],
        biome: BiomeType,
        policy: MergeTierPolicy,
    ) -> Result<AreaId, MapError> {
        if ids.len() < 2 {
            return Err(MapError::NothingToMerge);
        }
        let mut tiers = Vec::with_capacity(ids.len());
        for id in ids {
            let area = self.areas.get(id).ok_or(MapError::UnknownArea(*id))?;
            tiers.push(area.tier().ok_or(MapError::Untiered(*id))?);
        }
        let tier = policy
            .combine(&tiers)
            .ok_or(MapError::Untiered(ids[0]))?;

        let parts: Vec<Area> = ids
            .iter()
            .filter_map(|id| self.areas.remove(id))
            .collect();

        let id = self.allocate();
        let mut merged = Area::absorb(id, parts);
        merged.set_tier(tier);
        merged.set_biome(biome);
        for coords in merged.cells() {
            if let Some(cell) = self.cells.get_mut(coords) {
                cell.area = Some(id);
            }
        }
        self.areas.insert(id, merged);
        Ok(id)
    }

    fn allocate(&mut self) -> AreaId {
        let id = AreaId::from_raw(self.next_area);
        self.next_area += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_counts_by_radius() {
        assert_eq!(HexMap::new(0).total_cells(), 1);
        assert_eq!(HexMap::new(1).total_cells(), 7);
        assert_eq!(HexMap::new(2).total_cells(), 19);
        assert_eq!(HexMap::new(5).total_cells(), 91);
    }

    #[test]
    fn edge_cells_have_missing_neighbors() {
        let map = HexMap::new(1);
        let center = map.neighbors(Coords::ORIGIN).unwrap();
        assert_eq!(center.count(), 6);
        assert_eq!(center.center().coords(), Coords::ORIGIN);

        let edge = map.neighbors(Coords::new(1, 0)).unwrap();
        assert_eq!(edge.count(), 3);
        assert!(edge.get(HexDirection::East).is_none());
        assert_eq!(
            edge.get(HexDirection::West).map(HexCell::coords),
            Some(Coords::ORIGIN)
        );
        assert!(map.neighbors(Coords::new(5, 5)).is_none());
    }

    #[test]
    fn attach_refuses_taken_cells_and_full_areas() {
        let mut map = HexMap::new(1);
        let a = map.create_area(1);
        let b = map.create_area(2);

        assert!(map.attach(a, Coords::ORIGIN));
        assert!(!map.attach(a, Coords::new(1, 0)), "area a is full");
        assert!(!map.attach(b, Coords::ORIGIN), "origin already taken");
        assert!(map.attach(b, Coords::new(1, 0)));
        assert!(!map.attach(b, Coords::new(9, 9)), "outside the map");

        assert_eq!(map.area_of(Coords::ORIGIN).map(Area::id), Some(a));
        assert_eq!(map.cell(Coords::new(1, 0)).unwrap().area(), Some(b));
    }

    #[test]
    fn unassigned_neighbors_skips_taken_and_missing() {
        let mut map = HexMap::new(1);
        let a = map.create_area(3);
        map.attach(a, Coords::ORIGIN);
        map.attach(a, Coords::new(0, -1));

        let free: Vec<_> = map.unassigned_neighbors(Coords::new(1, 0)).collect();
        assert_eq!(free, vec![Coords::new(1, -1), Coords::new(0, 1)]);
    }

    #[test]
    fn merge_reparents_cells() {
        let mut map = HexMap::new(1);
        let a = map.create_area(2);
        let b = map.create_area(1);
        map.attach(a, Coords::ORIGIN);
        map.attach(a, Coords::new(1, 0));
        map.attach(b, Coords::new(0, 1));
        map.set_tier(a, 1).unwrap();
        map.set_tier(b, 3).unwrap();

        let merged = map
            .merge_areas(&[a, b], BiomeType::Forest, MergeTierPolicy::Max)
            .unwrap();

        assert!(map.area(a).is_none());
        assert!(map.area(b).is_none());
        let area = map.area(merged).unwrap();
        assert_eq!(area.capacity(), 3);
        assert_eq!(area.len(), 3);
        assert_eq!(area.tier(), Some(3));
        assert_eq!(area.biome(), Some(BiomeType::Forest));
        for coords in [Coords::ORIGIN, Coords::new(1, 0), Coords::new(0, 1)] {
            assert_eq!(map.cell(coords).unwrap().area(), Some(merged));
        }
        assert!(merged > b, "merged ids are freshly allocated");
    }

    #[test]
    fn merge_rejects_unknown_or_single_areas() {
        let mut map = HexMap::new(0);
        let a = map.create_area(1);
        assert_eq!(
            map.merge_areas(&[a], BiomeType::Meadow, MergeTierPolicy::Max),
            Err(MapError::NothingToMerge)
        );
        map.set_tier(a, 0).unwrap();
        let ghost = AreaId::from_raw(40);
        assert_eq!(
            map.merge_areas(&[a, ghost], BiomeType::Meadow, MergeTierPolicy::Max),
            Err(MapError::UnknownArea(ghost))
        );
        assert!(map.area(a).is_some());
    }

    #[test]
    fn merge_refuses_untiered_areas() {
        let mut map = HexMap::new(1);
        let a = map.create_area(1);
        let b = map.create_area(1);
        map.attach(a, Coords::ORIGIN);
        map.attach(b, Coords::new(1, 0));
        map.set_tier(a, 2).unwrap();

        assert_eq!(
            map.merge_areas(&[a, b], BiomeType::Swamp, MergeTierPolicy::Max),
            Err(MapError::Untiered(b))
        );
        assert_eq!(map.area_count(), 2);
        assert_eq!(map.cell(Coords::new(1, 0)).unwrap().area(), Some(b));
    }
}
