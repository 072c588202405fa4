//! Positions for unit tests: a static board, and synthetic game trees with known values

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    board::{Coord, Grid, Side},
    engine::{evaluation::Evaluate, opening::Layout},
    game::Position,
    score::Score,
};

/// A position with no moves: just a grid, a side to move and the scores
#[derive(Debug, Clone)]
pub(crate) struct BarePosition {
    grid: Grid,
    side: Side,
    ply: u32,
    scores: [u32; 2],
}

impl BarePosition {
    pub fn new(grid: Grid, side: Side) -> Self {
        Self {
            grid,
            side,
            ply: 0,
            scores: [0, 0],
        }
    }

    pub fn classic() -> Self {
        Self::new(Layout::Classic.grid().cloned().unwrap(), Side::White)
    }

    pub fn with_scores(mut self, white: u32, black: u32) -> Self {
        self.scores = [white, black];
        self
    }
}

impl Position for BarePosition {
    type Move = ();

    fn side_to_move(&self) -> Side {
        self.side
    }

    fn ply(&self) -> u32 {
        self.ply
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn score(&self, side: Side) -> u32 {
        match side {
            Side::White => self.scores[0],
            Side::Black => self.scores[1],
        }
    }

    fn legal_moves(&self) -> Vec<()> {
        Vec::new()
    }

    fn is_terminal(&self) -> bool {
        true
    }

    fn play(&self, _mv: &()) -> Self {
        self.clone()
    }

    fn find_move(&self, _from: Coord, _to: Coord) -> Option<()> {
        None
    }
}

#[derive(Debug)]
struct TreeNode {
    depth: u32,
    /// Heuristic value, from White's point of view
    value: f64,
    children: Vec<usize>,
    terminal: bool,
}

/// An explicit game tree; White moves at even depths
#[derive(Debug)]
pub(crate) struct GameTree {
    nodes: Vec<TreeNode>,
}

impl GameTree {
    /// Builds a tree breadth first, `depth` plies deep
    ///
    /// Node `i` gets `values[i % len]` and, unless it sits at full depth,
    /// `shape[i % len]` children; a node with no children is terminal.
    pub fn generate(depth: u32, shape: &[usize], values: &[f64]) -> Arc<Self> {
        let mut nodes = vec![TreeNode {
            depth: 0,
            value: values[0],
            children: Vec::new(),
            terminal: false,
        }];

        let mut i = 0;
        while i < nodes.len() {
            let width = if nodes[i].depth < depth {
                shape[i % shape.len()]
            } else {
                0
            };

            for _ in 0..width {
                let id = nodes.len();
                nodes.push(TreeNode {
                    depth: nodes[i].depth + 1,
                    value: values[id % values.len()],
                    children: Vec::new(),
                    terminal: false,
                });
                nodes[i].children.push(id);
            }
            nodes[i].terminal = width == 0;
            i += 1;
        }

        Arc::new(Self { nodes })
    }

    /// A complete tree with `branching` children per node and the given leaf values, left to right
    pub fn complete(branching: usize, leaves: &[f64]) -> Arc<Self> {
        let mut depth = 0;
        let mut width = 1;
        let mut inner = 0;
        while width < leaves.len() {
            inner += width;
            width *= branching;
            depth += 1;
        }
        assert_eq!(width, leaves.len(), "leaf count must be a power of the branching");

        let mut values = vec![0.0; inner];
        values.extend_from_slice(leaves);
        Self::generate(depth, &[branching], &values)
    }

    /// Marks a childless node as non-terminal, which no correct rules engine would do
    pub fn with_dead_end(mut self: Arc<Self>, node: usize) -> Arc<Self> {
        if let Some(tree) = Arc::get_mut(&mut self) {
            tree.nodes[node].terminal = false;
        }
        self
    }

    pub fn root(self: &Arc<Self>) -> TreePosition {
        TreePosition {
            tree: Arc::clone(self),
            node: 0,
            grid: Grid::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TreePosition {
    tree: Arc<GameTree>,
    node: usize,
    grid: Grid,
}

impl TreePosition {
    fn data(&self) -> &TreeNode {
        &self.tree.nodes[self.node]
    }
}

impl Position for TreePosition {
    /// Index into the node's children
    type Move = usize;

    fn side_to_move(&self) -> Side {
        if self.data().depth % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    fn ply(&self) -> u32 {
        self.data().depth
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn score(&self, _side: Side) -> u32 {
        0
    }

    fn legal_moves(&self) -> Vec<usize> {
        (0..self.data().children.len()).collect()
    }

    fn is_terminal(&self) -> bool {
        self.data().terminal
    }

    fn play(&self, mv: &usize) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            node: self.data().children[*mv],
            grid: Grid::default(),
        }
    }

    fn find_move(&self, _from: Coord, _to: Coord) -> Option<usize> {
        None
    }
}

/// Evaluates tree nodes by their stored value, remembering which nodes it was asked about
#[derive(Debug, Default)]
pub(crate) struct TreeValues {
    calls: Mutex<Vec<usize>>,
}

impl TreeValues {
    pub fn calls(&self) -> Vec<usize> {
        self.calls.lock().clone()
    }
}

impl Evaluate<TreePosition> for TreeValues {
    fn evaluate(&self, position: &TreePosition, side: Side) -> Score {
        self.calls.lock().push(position.node);
        let white = position.data().value;
        match side {
            Side::White => Score::new(white),
            Side::Black => Score::new(-white),
        }
    }
}
