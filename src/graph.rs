//! Area adjacency graph: biome coloring and same-color merging.
//!
//! The graph only knows area ids. Geometry is read from the [`HexMap`] once,
//! at build time; merging the backing areas is left to the caller, which
//! then swaps the merged node in with [`AreaGraph::replace_nodes`].

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use thiserror::Error;

use crate::biome::{BiomeType, BiomeValidity};
use crate::map::{AreaId, HexMap};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("no biome is valid for {node} at tier {tier}")]
    UnsatisfiableColoring { node: AreaId, tier: u32 },
    #[error("node {0} has not been colored")]
    Uncolored(AreaId),
    #[error("unknown node {0}")]
    UnknownNode(AreaId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaNode {
    id: AreaId,
    tier: u32,
    size: usize,
    edges: BTreeSet<AreaId>,
    possible: BTreeSet<BiomeType>,
    resolved: bool,
}

impl AreaNode {
    fn new(id: AreaId, tier: u32, size: usize, possible: BTreeSet<BiomeType>) -> Self {
        Self {
            id,
            tier,
            size,
            edges: BTreeSet::new(),
            resolved: possible.len() == 1,
            possible,
        }
    }

    pub fn id(&self) -> AreaId {
        self.id
    }

    pub fn tier(&self) -> u32 {
        self.tier
    }

    /// Cells covered by this node's area.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn edges(&self) -> &BTreeSet<AreaId> {
        &self.edges
    }

    pub fn possible_colors(&self) -> &BTreeSet<BiomeType> {
        &self.possible
    }

    pub fn color(&self) -> Option<BiomeType> {
        if self.resolved {
            self.possible.first().copied()
        } else {
            None
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    fn resolve(&mut self, color: BiomeType) {
        self.possible = BTreeSet::from([color]);
        self.resolved = true;
    }
}

/// Connected same-color nodes that should become one area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    pub members: Vec<AreaId>,
    pub color: BiomeType,
}

#[derive(Debug, Clone, Default)]
pub struct AreaGraph {
    nodes: BTreeMap<AreaId, AreaNode>,
}

impl AreaGraph {
    /// One node per area, with an edge wherever two areas share a cell
    /// border. Each node starts with the biomes valid for its area's tier.
    pub fn build(map: &HexMap, validity: &dyn BiomeValidity) -> Self {
        let mut nodes = BTreeMap::new();
        for area in map.areas() {
            let tier = area.tier().unwrap_or(0);
            let possible = validity.valid_biomes_for_tier(tier);
            nodes.insert(area.id(), AreaNode::new(area.id(), tier, area.len(), possible));
        }

        let mut graph = Self { nodes };
        for area in map.areas() {
            for coords in area.cells() {
                for neighbor in coords.neighbors() {
                    let Some(other) = map.cell(neighbor).and_then(|cell| cell.area()) else {
                        continue;
                    };
                    if other != area.id() {
                        graph.connect(area.id(), other);
                    }
                }
            }
        }

        tracing::debug!(
            target: "hexworld::graph",
            nodes = graph.len(),
            edges = graph.edge_count(),
            "graph.build"
        );
        graph
    }

    /// Adds a symmetric edge. Unknown ids and self-loops are ignored.
    pub fn connect(&mut self, a: AreaId, b: AreaId) {
        if a == b || !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            return;
        }
        if let Some(node) = self.nodes.get_mut(&a) {
            node.edges.insert(b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.edges.insert(a);
        }
    }

    pub fn node(&self, id: AreaId) -> Option<&AreaNode> {
        self.nodes.get(&id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &AreaNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.edges.len()).sum::<usize>() / 2
    }

    pub fn colors(&self) -> BTreeMap<AreaId, BiomeType> {
        self.nodes
            .values()
            .filter_map(|node| node.color().map(|color| (node.id, color)))
            .collect()
    }

    /// True when every node is colored and no edge joins two nodes of the
    /// same color.
    pub fn is_properly_colored(&self) -> bool {
        self.nodes.values().all(|node| {
            node.color().is_some_and(|color| {
                node.edges
                    .iter()
                    .filter_map(|edge| self.nodes.get(edge))
                    .all(|other| other.color() != Some(color))
            })
        })
    }

    /// Single greedy pass in id order.
    ///
    /// An unresolved node picks uniformly among its remaining colors, then
    /// its color is struck from every unresolved neighbor. A neighbor left
    /// with one option is resolved on the spot and cascades the same way,
    /// without revisiting nodes the pass has already left behind.
    ///
    /// A node whose tier admits a single biome starts out resolved and only
    /// propagates once the pass reaches it, so a neighbor visited earlier
    /// may share its color; the merge step absorbs those.
    ///
    /// Fails if any node runs out of colors.
    pub fn color<R: Rng>(&mut self, rng: &mut R) -> Result<(), GraphError> {
        let ids: Vec<AreaId> = self.nodes.keys().copied().collect();
        for id in ids {
            let color = {
                let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
                match node.color() {
                    Some(color) => color,
                    None => {
                        if node.possible.is_empty() {
                            return Err(GraphError::UnsatisfiableColoring {
                                node: id,
                                tier: node.tier,
                            });
                        }
                        let pick = rng.gen_range(0..node.possible.len());
                        let color = node.possible.iter().nth(pick).copied().ok_or(
                            GraphError::UnsatisfiableColoring {
                                node: id,
                                tier: node.tier,
                            },
                        )?;
                        node.resolve(color);
                        color
                    }
                }
            };
            self.propagate(id, color)?;
        }

        tracing::debug!(
            target: "hexworld::graph",
            nodes = self.len(),
            proper = self.is_properly_colored(),
            "graph.color"
        );
        Ok(())
    }

    fn propagate(&mut self, origin: AreaId, color: BiomeType) -> Result<(), GraphError> {
        let mut pending = vec![(origin, color)];
        while let Some((source, color)) = pending.pop() {
            let edges: Vec<AreaId> = match self.nodes.get(&source) {
                Some(node) => node.edges.iter().copied().collect(),
                None => continue,
            };
            for edge in edges {
                let Some(neighbor) = self.nodes.get_mut(&edge) else {
                    continue;
                };
                if neighbor.resolved {
                    continue;
                }
                neighbor.possible.remove(&color);
                match neighbor.possible.len() {
                    0 => {
                        return Err(GraphError::UnsatisfiableColoring {
                            node: edge,
                            tier: neighbor.tier,
                        })
                    }
                    1 => {
                        neighbor.resolved = true;
                        if let Some(forced) = neighbor.possible.first().copied() {
                            pending.push((edge, forced));
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Maximal connected groups (two or more nodes) sharing one color,
    /// ordered by their smallest member id.
    pub fn merge_groups(&self) -> Result<Vec<MergeGroup>, GraphError> {
        let mut visited = BTreeSet::new();
        let mut groups = Vec::new();
        for (id, node) in &self.nodes {
            if visited.contains(id) {
                continue;
            }
            let color = node.color().ok_or(GraphError::Uncolored(*id))?;
            let mut members = vec![*id];
            visited.insert(*id);
            let mut open = vec![*id];
            while let Some(current) = open.pop() {
                let Some(current) = self.nodes.get(&current) else {
                    continue;
                };
                for edge in &current.edges {
                    if visited.contains(edge) {
                        continue;
                    }
                    let Some(other) = self.nodes.get(edge) else {
                        continue;
                    };
                    if other.color() == Some(color) {
                        visited.insert(*edge);
                        members.push(*edge);
                        open.push(*edge);
                    }
                }
            }
            if members.len() >= 2 {
                members.sort();
                groups.push(MergeGroup { members, color });
            }
        }
        Ok(groups)
    }

    /// Swaps the members of `group` for one resolved node `merged` carrying
    /// their combined size and external edges.
    pub fn replace_nodes(
        &mut self,
        group: &MergeGroup,
        merged: AreaId,
        tier: u32,
    ) -> Result<(), GraphError> {
        let members: BTreeSet<AreaId> = group.members.iter().copied().collect();
        let mut size = 0;
        let mut external = BTreeSet::new();
        for id in &members {
            let node = self.nodes.remove(id).ok_or(GraphError::UnknownNode(*id))?;
            size += node.size;
            external.extend(node.edges.into_iter().filter(|edge| !members.contains(edge)));
        }

        for edge in &external {
            if let Some(neighbor) = self.nodes.get_mut(edge) {
                neighbor.edges.retain(|id| !members.contains(id));
                neighbor.edges.insert(merged);
            }
        }

        let mut node = AreaNode::new(merged, tier, size, BTreeSet::new());
        node.resolve(group.color);
        node.edges = external;
        self.nodes.insert(merged, node);
        Ok(())
    }
}
