//! Spatial index over committed label boxes.
//!
//! The primary backend is a region [`Quadtree`] whose nodes live in an
//! arena and refer to each other by [`NodeId`].  Each box is stored once,
//! at the deepest node whose quadrant fully contains it, so a query only
//! visits nodes whose bounds touch the query box.
//!
//! [`FlatIndex`] is the linear-scan fallback: fine for a few dozen labels,
//! quadratic over a whole run once N reaches the hundreds.
//!
//! # Design decisions
//!
//! * **Arena nodes.**  Children and parent links are `u32` indices, so the
//!   tree has no reference cycles and is dropped with a single `Vec`.
//! * **Root is a catch-all.**  Boxes outside the canvas (never committed by
//!   the orchestrator, but legal here) stay at the root and are always
//!   checked.
//! * **Caller refines.**  Queries return ids whose *boxes* intersect; the
//!   pixel test against cached masks is the caller's job.

use wordcloud_core::{Aabb, IndexBackend, LabelId, LayoutConfig, QuadtreeConfig};

// ───────────────────────────────────────────────────────────────────
// Trait
// ───────────────────────────────────────────────────────────────────

/// Box index tagged with label ids.  Insert-only within a run.
pub trait SpatialIndex: Send {
    fn insert(&mut self, aabb: Aabb, id: LabelId);

    /// Append to `out` every id whose box intersects `region`.
    fn query(&self, region: &Aabb, out: &mut Vec<LabelId>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

/// Fresh, empty index of the configured kind for a canvas.
pub fn build_index(config: &LayoutConfig) -> Box<dyn SpatialIndex> {
    match config.index {
        IndexBackend::Quadtree => Box::new(Quadtree::new(
            Aabb::from_rect(0, 0, config.width, config.height),
            config.quadtree,
        )),
        IndexBackend::Flat => Box::new(FlatIndex::new()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    aabb: Aabb,
    id: LabelId,
}

// ───────────────────────────────────────────────────────────────────
// Quadtree
// ───────────────────────────────────────────────────────────────────

/// Index of a node in the quadtree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    const ROOT: NodeId = NodeId(0);

    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Node {
    bounds: Aabb,
    depth: u8,
    parent: Option<NodeId>,
    /// NW, NE, SW, SE.
    children: Option<[NodeId; 4]>,
    items: Vec<Entry>,
}

impl Node {
    fn new(bounds: Aabb, depth: u8, parent: Option<NodeId>) -> Self {
        Self {
            bounds,
            depth,
            parent,
            children: None,
            items: Vec::new(),
        }
    }

    /// Quadrants of this node; `None` when too small to halve.
    fn quadrants(&self) -> Option<[Aabb; 4]> {
        let b = self.bounds;
        if b.width() < 2 || b.height() < 2 {
            return None;
        }
        let mid_x = b.min_x + b.width() / 2;
        let mid_y = b.min_y + b.height() / 2;
        Some([
            Aabb::new(b.min_x, b.min_y, mid_x, mid_y),
            Aabb::new(mid_x, b.min_y, b.max_x, mid_y),
            Aabb::new(b.min_x, mid_y, mid_x, b.max_y),
            Aabb::new(mid_x, mid_y, b.max_x, b.max_y),
        ])
    }
}

/// Region quadtree over a fixed world box.
#[derive(Clone, Debug)]
pub struct Quadtree {
    nodes: Vec<Node>,
    config: QuadtreeConfig,
    len: usize,
}

impl Quadtree {
    pub fn new(world: Aabb, config: QuadtreeConfig) -> Self {
        Self {
            nodes: vec![Node::new(world, 0, None)],
            config,
            len: 0,
        }
    }

    pub fn world(&self) -> Aabb {
        self.nodes[NodeId::ROOT.index()].bounds
    }

    /// Number of arena nodes (including the root).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest level currently in use.
    pub fn depth(&self) -> u8 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|n| n.parent)
    }

    /// Node currently holding `id`, if present.
    pub fn locate(&self, id: LabelId) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.items.iter().any(|e| e.id == id))
            .map(|i| NodeId(i as u32))
    }

    pub fn node_depth(&self, node: NodeId) -> Option<u8> {
        self.nodes.get(node.index()).map(|n| n.depth)
    }

    /// Child of `node` whose quadrant fully contains `aabb`.
    fn child_containing(&self, node: NodeId, aabb: &Aabb) -> Option<NodeId> {
        let children = self.nodes[node.index()].children?;
        children
            .into_iter()
            .find(|c| self.nodes[c.index()].bounds.contains_box(aabb))
    }

    fn split(&mut self, node: NodeId) {
        let Some(quadrants) = self.nodes[node.index()].quadrants() else {
            return;
        };
        let depth = self.nodes[node.index()].depth + 1;
        let first = self.nodes.len() as u32;
        for q in quadrants {
            self.nodes.push(Node::new(q, depth, Some(node)));
        }
        let children = [
            NodeId(first),
            NodeId(first + 1),
            NodeId(first + 2),
            NodeId(first + 3),
        ];
        self.nodes[node.index()].children = Some(children);

        // Push down whatever now fits in a single quadrant.
        let items = std::mem::take(&mut self.nodes[node.index()].items);
        for entry in items {
            match self.child_containing(node, &entry.aabb) {
                Some(child) => self.nodes[child.index()].items.push(entry),
                None => self.nodes[node.index()].items.push(entry),
            }
        }
    }
}

impl SpatialIndex for Quadtree {
    fn insert(&mut self, aabb: Aabb, id: LabelId) {
        let mut node = NodeId::ROOT;
        while let Some(child) = self.child_containing(node, &aabb) {
            node = child;
        }

        let n = &mut self.nodes[node.index()];
        n.items.push(Entry { aabb, id });
        let should_split = n.children.is_none()
            && n.items.len() > self.config.node_capacity
            && n.depth < self.config.max_depth;
        self.len += 1;

        if should_split {
            self.split(node);
        }
    }

    fn query(&self, region: &Aabb, out: &mut Vec<LabelId>) {
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if id != NodeId::ROOT && !node.bounds.intersects(region) {
                continue;
            }
            out.extend(
                node.items
                    .iter()
                    .filter(|e| e.aabb.intersects(region))
                    .map(|e| e.id),
            );
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        let world = self.world();
        self.nodes.clear();
        self.nodes.push(Node::new(world, 0, None));
        self.len = 0;
    }
}

// ───────────────────────────────────────────────────────────────────
// FlatIndex
// ───────────────────────────────────────────────────────────────────

/// Linear scan over every box.
#[derive(Clone, Debug, Default)]
pub struct FlatIndex {
    entries: Vec<Entry>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialIndex for FlatIndex {
    fn insert(&mut self, aabb: Aabb, id: LabelId) {
        self.entries.push(Entry { aabb, id });
    }

    fn query(&self, region: &Aabb, out: &mut Vec<LabelId>) {
        out.extend(
            self.entries
                .iter()
                .filter(|e| e.aabb.intersects(region))
                .map(|e| e.id),
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

// ===================================================================
// Tests
// ===================================================================
