//! Region nodes and the region stack machine.

use std::time::Duration;

use crate::{Error, Result};

/// Stable handle to a region node within a session's region tree.
///
/// Returned by [`Session::open()`](crate::Session::open) so the caller may close
/// the region directly without re-resolving it by name. Handles are only
/// meaningful for the session that created them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RegionId(pub(crate) usize);

/// A named timing accumulator node in the region tree.
///
/// Nodes are never destroyed during a measurement session; they persist and keep
/// accumulating across repeated open/close cycles, which is why counts and
/// totals are cumulative rather than per-activation.
#[derive(Clone, Debug)]
pub(crate) struct RegionNode {
    /// Unique among siblings under the same parent, not globally unique.
    pub(crate) name: String,

    /// Direct children, in insertion order. Insertion order is the stable
    /// tie-break when reporting sorts children by duration.
    pub(crate) children: Vec<RegionId>,

    /// Cumulative elapsed time across every completed activation.
    pub(crate) total_duration: Duration,

    /// Number of times this node has been opened.
    pub(crate) total_count: u64,

    /// Timestamp of the running activation; `None` while the node is closed.
    pub(crate) active_started: Option<Duration>,

    /// Total duration minus the summed total durations of direct children, in
    /// signed nanoseconds. Unset until a top-down reporting pass computes it;
    /// recomputed (overwritten) on every such pass. Negative only in
    /// pathological cases of timer interference, and passed through unclamped.
    pub(crate) exclusive_nanos: Option<i64>,
}

impl RegionNode {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
            total_duration: Duration::ZERO,
            total_count: 0,
            active_started: None,
            exclusive_nanos: None,
        }
    }
}

/// The region stack machine: an arena of region nodes, the named-roots table
/// and the ordered stack of currently open regions.
///
/// The stack always reflects proper nesting - the node at position `k` is a
/// child (in the tree) of the node at position `k - 1`.
#[derive(Clone, Debug)]
pub(crate) struct RegionTree {
    nodes: Vec<RegionNode>,
    roots: Vec<RegionId>,
    stack: Vec<RegionId>,
}

impl RegionTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub(crate) fn node(&self, id: RegionId) -> &RegionNode {
        self.nodes
            .get(id.0)
            .expect("region ids are only created by this tree and remain valid for its lifetime")
    }

    pub(crate) fn node_mut(&mut self, id: RegionId) -> &mut RegionNode {
        self.nodes
            .get_mut(id.0)
            .expect("region ids are only created by this tree and remain valid for its lifetime")
    }

    pub(crate) fn roots(&self) -> &[RegionId] {
        &self.roots
    }

    pub(crate) fn nodes(&self) -> &[RegionNode] {
        &self.nodes
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.nodes.iter().all(|node| node.total_count == 0)
    }

    /// Opens an activation of `name`, resolving it against the top of the stack.
    ///
    /// If the stack is non-empty the name resolves (or is created) as a child of
    /// the innermost open region; if the stack is empty it resolves as a root.
    /// A name equal to the innermost open region resolves to that same node -
    /// self-nesting is not supported and is rejected as re-entrant.
    pub(crate) fn open(&mut self, name: &str, now: Duration) -> Result<RegionId> {
        let id = match self.stack.last().copied() {
            Some(top) if self.node(top).name == name => top,
            Some(top) => self.resolve_child(top, name),
            None => self.resolve_root(name),
        };

        let node = self.node_mut(id);
        if node.active_started.is_some() {
            return Err(Error::Reentrancy {
                name: node.name.clone(),
            });
        }

        node.active_started = Some(now);
        node.total_count = node
            .total_count
            .checked_add(1)
            .expect("activation count overflows u64 - this indicates an unrealistic scenario");

        self.stack.push(id);
        Ok(id)
    }

    /// Closes the innermost open region, which must be named `name`.
    pub(crate) fn close_by_name(&mut self, name: &str, now: Duration) -> Result<()> {
        let top = *self.stack.last().ok_or(Error::StackUnderflow)?;

        let top_name = &self.node(top).name;
        if top_name != name {
            return Err(Error::Mismatch {
                expected: name.to_string(),
                actual: top_name.clone(),
            });
        }

        self.close(top, now)
    }

    /// Closes the running activation of a specific node.
    ///
    /// Accumulates the elapsed time, clears the activation and pops the stack,
    /// verifying that the popped node is this very node. The identity check
    /// detects nested open/close performed out of order even when names happen
    /// to coincide.
    pub(crate) fn close(&mut self, id: RegionId, now: Duration) -> Result<()> {
        let node = self.node_mut(id);
        let Some(started) = node.active_started else {
            return Err(Error::NotRunning {
                name: node.name.clone(),
            });
        };

        let elapsed = now.saturating_sub(started);
        node.total_duration = node.total_duration.checked_add(elapsed).expect(
            "accumulated duration overflows Duration - this indicates an unrealistic scenario",
        );
        node.active_started = None;

        match self.stack.pop() {
            None => Err(Error::StackUnderflow),
            Some(popped) if popped != id => Err(Error::Mismatch {
                expected: self.node(id).name.clone(),
                actual: self.node(popped).name.clone(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn resolve_root(&mut self, name: &str) -> RegionId {
        let existing = self
            .roots
            .iter()
            .copied()
            .find(|root| self.node(*root).name == name);

        existing.unwrap_or_else(|| {
            let id = self.insert(name);
            self.roots.push(id);
            id
        })
    }

    fn resolve_child(&mut self, parent: RegionId, name: &str) -> RegionId {
        let existing = self
            .node(parent)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).name == name);

        existing.unwrap_or_else(|| {
            let id = self.insert(name);
            self.node_mut(parent).children.push(id);
            id
        })
    }

    fn insert(&mut self, name: &str) -> RegionId {
        let id = RegionId(self.nodes.len());
        self.nodes.push(RegionNode::new(name.to_string()));
        id
    }
}
