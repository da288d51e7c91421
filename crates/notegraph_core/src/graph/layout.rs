//! Forest layout for derived graphs.
//!
//! Each root (a node without inbound edges) gets its own horizontal band.
//! Depth comes from a breadth-first walk from that root; a node reached by
//! several roots stays under the first one that claimed it. Edges from
//! other trees still come out as links, they just do not move the node.
//!
//! # Invariants
//! - Output is a pure function of `(graph, options)`.
//! - Every node of the input receives exactly one position.
//! - Links whose endpoints cannot be resolved are dropped and do not count
//!   as inbound edges, so their target can still be a root.

use crate::model::graph::{EdgeKey, Graph, NodeKey, NodeKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

const DEFAULT_NODE_SPACING: f64 = 60.0;
const DEFAULT_LEVEL_SPACING: f64 = 180.0;
const DEFAULT_MARGIN: f64 = 40.0;
const DEFAULT_TREE_GAP: f64 = 80.0;

/// Spacing parameters for [`layout`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Vertical distance between siblings on one level.
    pub node_spacing: f64,
    /// Horizontal distance between levels.
    pub level_spacing: f64,
    /// Offset of the first level and of the first tree.
    pub margin: f64,
    /// Vertical gap between consecutive trees.
    pub tree_gap: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_spacing: DEFAULT_NODE_SPACING,
            level_spacing: DEFAULT_LEVEL_SPACING,
            margin: DEFAULT_MARGIN,
            tree_gap: DEFAULT_TREE_GAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: NodeKey,
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedLink {
    pub id: EdgeKey,
    pub source: PositionedNode,
    pub target: PositionedNode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<PositionedLink>,
}

impl Layout {
    pub fn node(&self, id: &NodeKey) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    depth: usize,
    x: f64,
    y: f64,
}

/// Assigns tree coordinates to `graph`.
///
/// Roots are processed in node order. Nodes that no root reaches (a
/// prerequisite cycle without entry point) are laid out afterwards, each
/// unclaimed one acting as an extra root.
pub fn layout(graph: &Graph, options: &LayoutOptions) -> Layout {
    let count = graph.nodes.len();
    let mut index = HashMap::with_capacity(count);
    for (position, node) in graph.nodes.iter().enumerate() {
        index.entry(node.id).or_insert(position);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut has_parent = vec![false; count];
    for edge in &graph.edges {
        if let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target))
        {
            children[source].push(target);
            has_parent[target] = true;
        }
    }

    let mut placements: Vec<Option<Placement>> = vec![None; count];
    let mut claimed = vec![false; count];
    let mut cursor_y = options.margin;

    let roots = (0..count).filter(|&node| !has_parent[node]);
    let stragglers = 0..count;
    for root in roots.chain(stragglers) {
        if claimed[root] {
            continue;
        }
        cursor_y = place_tree(
            root,
            &children,
            &mut claimed,
            &mut placements,
            cursor_y,
            options,
        );
    }

    let nodes: Vec<PositionedNode> = graph
        .nodes
        .iter()
        .zip(placements)
        .filter_map(|(node, placement)| {
            placement.map(|placement| PositionedNode {
                id: node.id,
                name: node.name.clone(),
                kind: node.kind,
                depth: placement.depth,
                x: placement.x,
                y: placement.y,
            })
        })
        .collect();

    let by_id: HashMap<NodeKey, &PositionedNode> =
        nodes.iter().rev().map(|node| (node.id, node)).collect();
    let mut dropped = 0usize;
    let links: Vec<PositionedLink> = graph
        .edges
        .iter()
        .filter_map(|edge| match (by_id.get(&edge.source), by_id.get(&edge.target)) {
            (Some(source), Some(target)) => Some(PositionedLink {
                id: edge.id,
                source: (*source).clone(),
                target: (*target).clone(),
            }),
            _ => {
                dropped += 1;
                None
            }
        })
        .collect();
    if dropped > 0 {
        debug!("event=graph_layout module=graph status=ok dropped_links={dropped}");
    }

    Layout { nodes, links }
}

/// Lays out the tree below `root` starting at `top`; returns the next cursor.
fn place_tree(
    root: usize,
    children: &[Vec<usize>],
    claimed: &mut [bool],
    placements: &mut [Option<Placement>],
    top: f64,
    options: &LayoutOptions,
) -> f64 {
    let mut levels: Vec<Vec<usize>> = Vec::new();
    let mut queue = VecDeque::from([(root, 0usize)]);
    claimed[root] = true;

    while let Some((node, depth)) = queue.pop_front() {
        if levels.len() <= depth {
            levels.push(Vec::new());
        }
        levels[depth].push(node);
        for &child in &children[node] {
            if !claimed[child] {
                claimed[child] = true;
                queue.push_back((child, depth + 1));
            }
        }
    }

    let widest = levels.iter().map(Vec::len).max().unwrap_or(0);
    let tree_height = (options.node_spacing * widest as f64).max(options.node_spacing);

    for (depth, level) in levels.iter().enumerate() {
        let span = (level.len() as f64 - 1.0) * options.node_spacing;
        let start_y = top + (tree_height - span) / 2.0;
        for (slot, &node) in level.iter().enumerate() {
            placements[node] = Some(Placement {
                depth,
                x: options.margin + options.level_spacing * depth as f64,
                y: start_y + slot as f64 * options.node_spacing,
            });
        }
    }

    if levels.is_empty() {
        top
    } else {
        top + tree_height + options.tree_gap
    }
}
