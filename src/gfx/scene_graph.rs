//! Scene graph node tree and frame walks
//!
//! The graph is a plain tree of object ids; children are owned by their
//! parent node, so cycles cannot be constructed. Insertion order is
//! traversal order.
//!
//! Two walks run per frame:
//!
//! * the **update walk** flows each parent's world matrix down the tree and
//!   lets every node recompute its composed matrix through a resolver
//!   callback,
//! * the **render walk** flattens the tree into draw order, post-order, so
//!   children are emitted before the node itself.
//!
//! Node id 0 is structural only: it contributes identity to the matrix
//! chain, never resolves a transform and never emits a draw entry. Both
//! walks are explicit-stack iterations, not recursion.

use cgmath::Matrix4;

/// Id of structural nodes that group children without owning a transform
pub const STRUCTURAL_ID: u64 = 0;

/// One node in the scene tree
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub id: u64,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            children: Vec::new(),
        }
    }

    pub fn with_children(id: u64, children: Vec<Node>) -> Self {
        Self { id, children }
    }

    /// Appends a child; children render and update in insertion order
    pub fn add_child(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        self.children.last_mut().unwrap()
    }
}

/// Root-to-leaf matrix propagation
///
/// `resolve` receives a node id and the parent's world matrix and returns
/// the node's composed world matrix, which then flows to its children.
/// Structural nodes pass the parent matrix through unchanged.
pub fn update_walk<F>(root: &Node, root_matrix: Matrix4<f32>, mut resolve: F)
where
    F: FnMut(u64, Matrix4<f32>) -> Matrix4<f32>,
{
    let mut stack: Vec<(&Node, Matrix4<f32>)> = vec![(root, root_matrix)];

    while let Some((node, parent)) = stack.pop() {
        let world = if node.id == STRUCTURAL_ID {
            parent
        } else {
            resolve(node.id, parent)
        };

        // Reverse push keeps insertion order on the pop side.
        for child in node.children.iter().rev() {
            stack.push((child, world));
        }
    }
}

/// Post-order flattening into draw order
///
/// Children are emitted before the node itself. Structural nodes are walked
/// but never emitted.
pub fn render_walk<F>(root: &Node, mut emit: F)
where
    F: FnMut(u64),
{
    enum Visit<'a> {
        Enter(&'a Node),
        Emit(&'a Node),
    }

    let mut stack = vec![Visit::Enter(root)];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(node) => {
                stack.push(Visit::Emit(node));
                for child in node.children.iter().rev() {
                    stack.push(Visit::Enter(child));
                }
            }
            Visit::Emit(node) => {
                if node.id != STRUCTURAL_ID {
                    emit(node.id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector3};

    use crate::gfx::math;

    fn sample_tree() -> Node {
        // 0 (structural root)
        // ├── 1
        // │   ├── 2
        // │   └── 3
        // └── 4
        Node::with_children(
            STRUCTURAL_ID,
            vec![
                Node::with_children(1, vec![Node::new(2), Node::new(3)]),
                Node::new(4),
            ],
        )
    }

    #[test]
    fn test_update_walk_flows_parent_matrices_down() {
        let root = sample_tree();
        let mut seen: Vec<(u64, Matrix4<f32>)> = Vec::new();

        update_walk(&root, Matrix4::identity(), |id, parent| {
            seen.push((id, parent));
            // Each node shifts its subtree by its id along x.
            math::translation(Vector3::new(id as f32, 0.0, 0.0)) * parent
        });

        let find = |id: u64| seen.iter().find(|(i, _)| *i == id).unwrap().1;
        // Children of node 1 see node 1's world matrix, not the root's.
        assert_eq!(find(1), Matrix4::identity());
        assert_eq!(find(2), math::translation(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(find(3), math::translation(Vector3::new(1.0, 0.0, 0.0)));
        // Node 4 hangs off the structural root directly.
        assert_eq!(find(4), Matrix4::identity());
    }

    #[test]
    fn test_update_walk_visits_in_insertion_order() {
        let root = sample_tree();
        let mut order = Vec::new();
        update_walk(&root, Matrix4::identity(), |id, parent| {
            order.push(id);
            parent
        });
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_render_walk_is_post_order_and_skips_structural_nodes() {
        let root = sample_tree();
        let mut order = Vec::new();
        render_walk(&root, |id| order.push(id));

        // Children before their parent; structural id 0 never appears.
        assert_eq!(order, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_structural_nodes_contribute_identity() {
        // A structural node inserted mid-chain must not disturb the matrix
        // flow to its children.
        let root = Node::with_children(
            1,
            vec![Node::with_children(STRUCTURAL_ID, vec![Node::new(2)])],
        );

        let mut parent_of_2 = Matrix4::identity();
        update_walk(&root, Matrix4::identity(), |id, parent| {
            if id == 2 {
                parent_of_2 = parent;
            }
            math::translation(Vector3::new(0.0, id as f32, 0.0)) * parent
        });

        assert_eq!(parent_of_2, math::translation(Vector3::new(0.0, 1.0, 0.0)));
    }
}
