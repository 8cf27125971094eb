//! Bracket data models: seats, matches and the nested tree export.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Seat identifier, doubling as the tree key
pub type Position = i64;

/// Stack headroom kept free while serializing nested subtrees
const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each extra stack segment allocated for deep subtrees
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// A seat in the bracket tree
///
/// Each node exclusively owns its children. Child slots are filled by
/// insertion and never rebalanced or removed. Cloning, comparing, exporting
/// and dropping walk the subtree with an explicit stack, so chain-shaped
/// brackets of any depth are safe.
#[derive(Debug)]
pub struct Node<T> {
    pub(crate) position: Position,
    pub(crate) payload: T,
    pub(crate) left: Option<Box<Node<T>>>,
    pub(crate) right: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    /// Create a childless node
    pub fn new(position: Position, payload: T) -> Self {
        Self {
            position,
            payload,
            left: None,
            right: None,
        }
    }

    /// Attach a left subtree
    pub fn with_left(mut self, left: Node<T>) -> Self {
        self.left = Some(Box::new(left));
        self
    }

    /// Attach a right subtree
    pub fn with_right(mut self, right: Node<T>) -> Self {
        self.right = Some(Box::new(right));
        self
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    pub fn left(&self) -> Option<&Node<T>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<T>> {
        self.right.as_deref()
    }

    /// True when neither child slot is filled
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Export this subtree as a nested mapping
    pub fn export(&self) -> TreeExport<T>
    where
        T: Clone,
    {
        self.fold(|node, left, right| TreeExport {
            position: node.position,
            payload: node.payload.clone(),
            left: left.map(Box::new),
            right: right.map(Box::new),
        })
    }

    /// Build a value bottom-up, children before parents
    fn fold<U>(&self, mut assemble: impl FnMut(&Node<T>, Option<U>, Option<U>) -> U) -> U {
        let mut pending: Vec<(&Node<T>, bool)> = Vec::new();
        let mut built: Vec<U> = Vec::new();

        Self::push_children(self, &mut pending);
        while let Some((node, children_done)) = pending.pop() {
            if children_done {
                let (left, right) = Self::pop_children(node, &mut built);
                built.push(assemble(node, left, right));
            } else {
                pending.push((node, true));
                Self::push_children(node, &mut pending);
            }
        }

        let (left, right) = Self::pop_children(self, &mut built);
        assemble(self, left, right)
    }

    // Right first, so the left subtree is finished first
    fn push_children<'a>(node: &'a Node<T>, pending: &mut Vec<(&'a Node<T>, bool)>) {
        if let Some(right) = node.right.as_deref() {
            pending.push((right, false));
        }
        if let Some(left) = node.left.as_deref() {
            pending.push((left, false));
        }
    }

    fn pop_children<U>(node: &Node<T>, built: &mut Vec<U>) -> (Option<U>, Option<U>) {
        let right = node.right.as_ref().and_then(|_| built.pop());
        let left = node.left.as_ref().and_then(|_| built.pop());
        (left, right)
    }
}

impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        self.fold(|node, left, right| Node {
            position: node.position,
            payload: node.payload.clone(),
            left: left.map(Box::new),
            right: right.map(Box::new),
        })
    }
}

impl<T: PartialEq> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.position != b.position || a.payload != b.payload {
                return false;
            }
            for pair in [(&a.left, &b.left), (&a.right, &b.right)] {
                match pair {
                    (Some(x), Some(y)) => stack.push((&**x, &**y)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl<T: Eq> Eq for Node<T> {}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        let mut detached: Vec<Box<Node<T>>> = Vec::new();
        detached.extend(self.left.take());
        detached.extend(self.right.take());
        while let Some(mut node) = detached.pop() {
            detached.extend(node.left.take());
            detached.extend(node.right.take());
        }
    }
}

/// Nested mapping form of a subtree
///
/// Absent children are omitted when serialized.
#[derive(Debug, Deserialize)]
pub struct TreeExport<T> {
    pub position: Position,
    pub payload: T,
    pub left: Option<Box<TreeExport<T>>>,
    pub right: Option<Box<TreeExport<T>>>,
}

impl<T> TreeExport<T> {
    /// Seats in pre-order (self, left, right)
    ///
    /// Re-inserting in this order reproduces the exported shape.
    pub fn preorder(&self) -> Vec<(Position, &T)> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            out.push((tree.position, &tree.payload));
            if let Some(right) = tree.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = tree.left.as_deref() {
                stack.push(left);
            }
        }
        out
    }
}

impl<T: PartialEq> PartialEq for TreeExport<T> {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.position != b.position || a.payload != b.payload {
                return false;
            }
            for pair in [(&a.left, &b.left), (&a.right, &b.right)] {
                match pair {
                    (Some(x), Some(y)) => stack.push((&**x, &**y)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl<T: Eq> Eq for TreeExport<T> {}

impl<T> Drop for TreeExport<T> {
    fn drop(&mut self) {
        let mut detached: Vec<Box<TreeExport<T>>> = Vec::new();
        detached.extend(self.left.take());
        detached.extend(self.right.take());
        while let Some(mut tree) = detached.pop() {
            detached.extend(tree.left.take());
            detached.extend(tree.right.take());
        }
    }
}

impl<T: Serialize> Serialize for TreeExport<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            let len = 2 + usize::from(self.left.is_some()) + usize::from(self.right.is_some());
            let mut state = serializer.serialize_struct("TreeExport", len)?;
            state.serialize_field("position", &self.position)?;
            state.serialize_field("payload", &self.payload)?;
            match &self.left {
                Some(left) => state.serialize_field("left", left)?,
                None => state.skip_field("left")?,
            }
            match &self.right {
                Some(right) => state.serialize_field("right", right)?,
                None => state.skip_field("right")?,
            }
            state.end()
        })
    }
}

/// A contest between two seats
///
/// The winner's payload is copied to `winner_to` and the loser's payload to
/// `loser_to` when the match is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    seats: [Position; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner_to: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loser_to: Option<Position>,
}

impl Match {
    /// Create a match between two seats with no destinations
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            seats: [a, b],
            winner_to: None,
            loser_to: None,
        }
    }

    /// Send the winner to a later seat
    pub fn with_winner_to(mut self, seat: Position) -> Self {
        self.winner_to = Some(seat);
        self
    }

    /// Send the loser to a later seat
    pub fn with_loser_to(mut self, seat: Position) -> Self {
        self.loser_to = Some(seat);
        self
    }

    pub fn seats(&self) -> [Position; 2] {
        self.seats
    }

    pub fn winner_to(&self) -> Option<Position> {
        self.winner_to
    }

    pub fn loser_to(&self) -> Option<Position> {
        self.loser_to
    }

    /// Whether `seat` plays in this match
    pub fn contains(&self, seat: Position) -> bool {
        self.seats.contains(&seat)
    }

    /// The other seat in the pair, or `None` if `seat` doesn't play here
    pub fn opponent(&self, seat: Position) -> Option<Position> {
        match self.seats {
            [a, b] if a == seat => Some(b),
            [a, b] if b == seat => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.seats;
        write!(f, "{a} v {b}")?;
        match (self.winner_to, self.loser_to) {
            (Some(w), Some(l)) => write!(f, " (W→{w}, L→{l})"),
            (Some(w), None) => write!(f, " (W→{w})"),
            (None, Some(l)) => write!(f, " (L→{l})"),
            (None, None) => Ok(()),
        }
    }
}

/// Bracket configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketConfig {
    /// Match table, converted into the bracket's matches at construction
    #[serde(default)]
    pub matches: Vec<Match>,

    /// Seats filled by `seed`, in assignment order
    #[serde(default)]
    pub seed_order: Option<Vec<Position>>,
}

impl BracketConfig {
    /// Add a match to the table
    pub fn with_match(mut self, m: Match) -> Self {
        self.matches.push(m);
        self
    }

    /// Set the seed order
    pub fn with_seed_order(mut self, seed_order: Vec<Position>) -> Self {
        self.seed_order = Some(seed_order);
        self
    }
}
