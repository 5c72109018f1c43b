//! Bulk loading and rank search for the page-indexed tree.

use crate::node::{InternalNode, LeafNode, Node, NodeId};
use rankine_common::{Record, TreeConfig};

/// A static search tree bulk-loaded from sorted records.
///
/// Leaves are packed left-to-right at fixed capacity; parent layers group up
/// to `page_size` children each, recording every child's first key as a
/// separator, until a single root remains. The tree is immutable after
/// loading.
#[derive(Debug)]
pub struct PagedTree {
    nodes: Vec<Node>,
    root: NodeId,
    len: usize,
    page_size: usize,
}

impl PagedTree {
    /// Bulk-loads the tree from records sorted ascending by key.
    ///
    /// Page sizes below 2 are treated as 2 (a fanout of 1 cannot terminate).
    pub fn bulk_load(records: &[Record], config: TreeConfig) -> Self {
        let page_size = config.page_size.max(2);
        debug_assert!(records.windows(2).all(|w| w[0].key <= w[1].key));

        let mut nodes = Vec::new();
        if records.is_empty() {
            return Self {
                nodes,
                root: 0,
                len: 0,
                page_size,
            };
        }

        // Pack the leaf layer.
        let mut layer: Vec<NodeId> = Vec::new();
        let mut base_rank = 0;
        for chunk in records.chunks(page_size) {
            nodes.push(Node::Leaf(LeafNode {
                keys: chunk.iter().map(|r| r.key).collect(),
                base_rank,
            }));
            layer.push((nodes.len() - 1) as NodeId);
            base_rank += chunk.len();
        }

        // Build parent layers until one node remains.
        while layer.len() > 1 {
            let mut parents: Vec<NodeId> = Vec::new();
            for group in layer.chunks(page_size) {
                let separators = group[1..]
                    .iter()
                    .map(|&child| nodes[child as usize].first_key())
                    .collect();
                let first_key = nodes[group[0] as usize].first_key();
                nodes.push(Node::Internal(InternalNode {
                    separators,
                    children: group.to_vec(),
                    first_key,
                }));
                parents.push((nodes.len() - 1) as NodeId);
            }
            layer = parents;
        }

        let root = layer[0];
        Self {
            nodes,
            root,
            len: records.len(),
            page_size,
        }
    }

    /// Rank of `key`: the smallest index `i` with `keys[i] >= key` in the
    /// loaded sort order, or `len()` if every key is smaller.
    pub fn lower_bound(&self, key: f64) -> usize {
        if self.len == 0 {
            return 0;
        }

        let mut id = self.root;
        loop {
            match &self.nodes[id as usize] {
                Node::Internal(node) => id = node.select_child(key),
                Node::Leaf(leaf) => {
                    return leaf.base_rank + leaf.keys.partition_point(|&k| k < key);
                }
            }
        }
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the tree holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The leaf/internal fanout the tree was loaded with.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of levels from root to leaf (0 for an empty tree).
    pub fn height(&self) -> usize {
        if self.len == 0 {
            return 0;
        }
        let mut height = 1;
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id as usize] {
            height += 1;
            id = node.children[0];
        }
        height
    }

    /// Approximate heap footprint of all nodes.
    pub fn size_bytes(&self) -> usize {
        self.nodes.iter().map(Node::size_bytes).sum()
    }
}
