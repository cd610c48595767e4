//! Reachable state graph.
//!
//! Breadth-first exploration from the empty board. Nodes are state codes,
//! edges are single placements. The graph has cycles: FIFO eviction lets a
//! position come back.

use std::collections::{HashMap, VecDeque};

use morris_core::{GameState, Player, Result, StateCode};

/// Index of a node in the graph.
pub type NodeId = usize;

/// Every state reachable from the initial position with its edges.
#[derive(Debug, Default)]
pub struct StateGraph {
    codes: Vec<StateCode>,
    winners: Vec<Option<Player>>,
    depths: Vec<u32>,
    children: Vec<Vec<NodeId>>,
    parents: Vec<Vec<NodeId>>,
    index: HashMap<StateCode, NodeId>,
    edges: usize,
}

impl StateGraph {
    /// Explore from the empty board.
    pub fn explore() -> Result<Self> {
        Self::explore_from(GameState::new().encode())
    }

    /// Explore everything reachable from `root`.
    pub fn explore_from(root: StateCode) -> Result<Self> {
        let mut graph = StateGraph::default();
        let mut queue = VecDeque::new();

        let root_state = GameState::decode(root)?;
        let root_id = graph.add_node(root, root_state.winner(), 0);
        queue.push_back((root_id, root_state));

        while let Some((id, state)) = queue.pop_front() {
            // Finished games have no moves.
            if state.is_over() {
                continue;
            }
            let depth = graph.depths[id] + 1;
            for pos in state.empty_positions() {
                let child = GameState::decode(state.play(pos)?.encode())?;
                let code = child.encode();
                let child_id = match graph.index.get(&code) {
                    Some(&existing) => existing,
                    None => {
                        let new_id = graph.add_node(code, child.winner(), depth);
                        queue.push_back((new_id, child));
                        new_id
                    }
                };
                graph.children[id].push(child_id);
                graph.parents[child_id].push(id);
                graph.edges += 1;
            }
        }

        Ok(graph)
    }

    fn add_node(&mut self, code: StateCode, winner: Option<Player>, depth: u32) -> NodeId {
        let id = self.codes.len();
        self.codes.push(code);
        self.winners.push(winner);
        self.depths.push(depth);
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        self.index.insert(code, id);
        id
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// The root is always node 0.
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn id(&self, code: StateCode) -> Option<NodeId> {
        self.index.get(&code).copied()
    }

    pub fn code(&self, id: NodeId) -> StateCode {
        self.codes[id]
    }

    pub fn winner(&self, id: NodeId) -> Option<Player> {
        self.winners[id]
    }

    /// Player to move at `id`.
    pub fn turn(&self, id: NodeId) -> Player {
        self.codes[id].turn()
    }

    /// BFS level at which the node was first reached.
    pub fn depth(&self, id: NodeId) -> u32 {
        self.depths[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id]
    }

    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.parents[id]
    }

    /// Nodes without moves, i.e. finished games.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.len()).filter(|&id| self.children[id].is_empty())
    }

    pub fn max_depth(&self) -> u32 {
        self.depths.iter().copied().max().unwrap_or(0)
    }
}
