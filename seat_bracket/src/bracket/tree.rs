//! The bracket tree: seat insertion, traversal, seeding and match progression.

use super::errors::{BracketError, BracketResult};
use super::models::{BracketConfig, Match, Node, Position, TreeExport};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

/// Single-elimination bracket keyed by seat position
///
/// Seats form an unbalanced binary search tree. The order of `add` calls
/// decides the shape, so callers insert seats in bracket order (round one
/// before the placeholders of later rounds) and `seats` hands that order
/// back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket<T> {
    root: Option<Box<Node<T>>>,
    /// Every position passed to `add`, duplicates included
    insertion_order: Vec<Position>,
    seed_order: Option<Vec<Position>>,
    matches: Vec<Match>,
}

impl<T> Default for Bracket<T> {
    fn default() -> Self {
        Self {
            root: None,
            insertion_order: Vec::new(),
            seed_order: None,
            matches: Vec::new(),
        }
    }
}

impl<T> Bracket<T> {
    /// Create an empty bracket with no matches or seed order
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bracket from a configuration
    pub fn with_config(config: BracketConfig) -> Self {
        Self {
            matches: config.matches,
            seed_order: config.seed_order,
            ..Self::default()
        }
    }

    /// Insert a seat
    ///
    /// The position is always appended to the insertion log. A position that
    /// is already seated leaves the tree untouched.
    pub fn add(&mut self, position: Position, payload: T) {
        self.insertion_order.push(position);

        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match position.cmp(&node.position) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => {
                    log::debug!("Seat {} already present, ignoring insert", position);
                    return;
                }
            };
        }
        *slot = Some(Box::new(Node::new(position, payload)));
    }

    /// First seat with this position in key order
    pub fn at(&self, position: Position) -> Option<&Node<T>> {
        self.iter().find(|node| node.position == position)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.at(position).is_some()
    }

    /// Overwrite the payload at `position`
    ///
    /// Returns `false` if no such seat exists.
    pub fn replace(&mut self, position: Position, payload: T) -> bool {
        match self.iter_mut().find(|(seat, _)| *seat == position) {
            Some((_, slot)) => {
                *slot = payload;
                true
            }
            None => false,
        }
    }

    /// Seats in ascending position order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_deref())
    }

    /// Positions and mutable payloads in ascending position order
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.root.as_deref_mut())
    }

    /// Seats in the order they were first added
    ///
    /// Seats that never went through `add` (installed with `set_root`) come
    /// last, in position order.
    pub fn seats(&self) -> Vec<&Node<T>> {
        let mut first_seen: HashMap<Position, usize> = HashMap::new();
        for (idx, &position) in self.insertion_order.iter().enumerate() {
            first_seen.entry(position).or_insert(idx);
        }

        let mut nodes: Vec<&Node<T>> = self.iter().collect();
        nodes.sort_by_key(|node| {
            first_seen
                .get(&node.position)
                .copied()
                .unwrap_or(usize::MAX)
        });
        nodes
    }

    /// Array form of the bracket, same as [`Bracket::seats`]
    pub fn to_vec(&self) -> Vec<&Node<T>> {
        self.seats()
    }

    /// Number of seats in the tree
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&Node<T>> {
        self.root.as_deref()
    }

    /// Install a prebuilt tree, replacing the current one
    ///
    /// The insertion log is left as is.
    pub fn set_root(&mut self, root: Option<Node<T>>) {
        self.root = root.map(Box::new);
    }

    pub fn insertion_order(&self) -> &[Position] {
        &self.insertion_order
    }

    pub fn seed_order(&self) -> Option<&[Position]> {
        self.seed_order.as_deref()
    }

    pub fn set_seed_order(&mut self, seed_order: Vec<Position>) {
        self.seed_order = Some(seed_order);
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn add_match(&mut self, m: Match) {
        self.matches.push(m);
    }

    /// First match that `seat` plays in
    pub fn match_for(&self, seat: Position) -> Option<&Match> {
        self.matches.iter().find(|m| m.contains(seat))
    }

    /// Assign players to the seed order, front to back
    ///
    /// Fails before touching any seat if no seed order is set or if there
    /// are more players than seed slots. Fewer players than slots leaves the
    /// trailing slots as they were.
    pub fn seed<I>(&mut self, players: I) -> BracketResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        let slots = self
            .seed_order
            .clone()
            .ok_or(BracketError::MissingSeedOrder)?;
        let mut players: VecDeque<T> = players.into_iter().collect();

        if players.len() > slots.len() {
            return Err(BracketError::SeedLimitExceeded {
                players: players.len(),
                slots: slots.len(),
            });
        }

        let seeded = players.len();
        for position in slots {
            let Some(player) = players.pop_front() else {
                break;
            };
            if !self.replace(position, player) {
                log::debug!("Seed slot {} has no seat, skipping", position);
            }
        }

        log::info!("Seeded {} players", seeded);
        Ok(())
    }
}

impl<T: Clone> Bracket<T> {
    /// Resolve the match `seat` plays in, with `seat` as the winner
    ///
    /// Copies the winner's payload to the match's winner destination and the
    /// opponent's payload to its loser destination. Returns `false` if the
    /// seat plays in no match.
    pub fn match_winner(&mut self, seat: Position) -> bool {
        let Some(m) = self.match_for(seat).copied() else {
            log::debug!("Seat {} plays in no match", seat);
            return false;
        };
        let Some(loser) = m.opponent(seat) else {
            return false;
        };

        if let Some(dest) = m.winner_to() {
            self.copy_payload(seat, dest);
        }
        if let Some(dest) = m.loser_to() {
            self.copy_payload(loser, dest);
        }
        true
    }

    /// Resolve the match `seat` plays in, with `seat` as the loser
    ///
    /// Same effects as calling [`Bracket::match_winner`] on the opponent.
    pub fn match_loser(&mut self, seat: Position) -> bool {
        let Some(winner) = self.match_for(seat).and_then(|m| m.opponent(seat)) else {
            log::debug!("Seat {} plays in no match", seat);
            return false;
        };
        self.match_winner(winner)
    }

    /// Rebuild a bracket from its nested export
    ///
    /// Seats are re-added in pre-order, which reproduces the exported shape.
    pub fn from_tree(tree: TreeExport<T>) -> Self {
        let mut bracket = Self::new();
        for (position, payload) in tree.preorder() {
            bracket.add(position, payload.clone());
        }
        bracket
    }

    /// Export the tree as a nested mapping
    pub fn to_tree(&self) -> Option<TreeExport<T>> {
        self.root.as_ref().map(|root| root.export())
    }

    fn copy_payload(&mut self, from: Position, to: Position) -> bool {
        match self.at(from).map(|node| node.payload.clone()) {
            Some(payload) => self.replace(to, payload),
            None => {
                log::debug!("Seat {} is not in the bracket, nothing to copy", from);
                false
            }
        }
    }
}

impl<T: Clone + Serialize> Bracket<T> {
    /// Render the nested export as JSON (`null` for an empty bracket)
    pub fn to_json(&self) -> BracketResult<String> {
        Ok(serde_json::to_string(&self.to_tree())?)
    }
}

impl<T: Clone + DeserializeOwned> Bracket<T> {
    /// Rebuild a bracket from JSON produced by [`Bracket::to_json`]
    ///
    /// Nesting depth is unbounded: chain-shaped brackets nest one level per
    /// seat, so the parser grows its stack on demand instead.
    pub fn from_json(json: &str) -> BracketResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();
        let tree = Option::<TreeExport<T>>::deserialize(serde_stacker::Deserializer::new(
            &mut deserializer,
        ))?;
        deserializer.end()?;
        Ok(tree.map(Self::from_tree).unwrap_or_default())
    }
}

impl<'a, T> IntoIterator for &'a Bracket<T> {
    type Item = &'a Node<T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over seats
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn new(root: Option<&'a Node<T>>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left(root);
        iter
    }

    fn push_left(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(node)
    }
}

/// In-order iterator over positions and mutable payloads
pub struct IterMut<'a, T> {
    stack: Vec<(Position, &'a mut T, Option<&'a mut Node<T>>)>,
}

impl<'a, T> IterMut<'a, T> {
    fn new(root: Option<&'a mut Node<T>>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left(root);
        iter
    }

    fn push_left(&mut self, mut node: Option<&'a mut Node<T>>) {
        while let Some(n) = node {
            let Node {
                position,
                payload,
                left,
                right,
            } = n;
            self.stack.push((*position, payload, right.as_deref_mut()));
            node = left.as_deref_mut();
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (Position, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        let (position, payload, right) = self.stack.pop()?;
        self.push_left(right);
        Some((position, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions<T>(nodes: &[&Node<T>]) -> Vec<Position> {
        nodes.iter().map(|node| node.position()).collect()
    }

    fn finals_bracket() -> Bracket<&'static str> {
        let config = BracketConfig::default()
            .with_match(Match::new(10, 11).with_winner_to(20).with_loser_to(21));
        let mut bracket = Bracket::with_config(config);
        bracket.add(20, "TBD");
        bracket.add(10, "Alice");
        bracket.add(11, "Bob");
        bracket.add(21, "TBD");
        bracket
    }

    #[test]
    fn test_first_add_becomes_root() {
        let mut bracket = Bracket::new();
        assert!(bracket.is_empty());
        bracket.add(5, "five");
        assert_eq!(bracket.root().map(Node::position), Some(5));
        assert_eq!(bracket.len(), 1);
    }

    #[test]
    fn test_add_descends_by_position() {
        let mut bracket = Bracket::new();
        for position in [4, 2, 6, 1, 3] {
            bracket.add(position, ());
        }
        let root = bracket.root().unwrap();
        let left = root.left().unwrap();
        assert_eq!(left.position(), 2);
        assert_eq!(left.left().map(Node::position), Some(1));
        assert_eq!(left.right().map(Node::position), Some(3));
        assert_eq!(root.right().map(Node::position), Some(6));
    }

    #[test]
    fn test_duplicate_add_is_ignored_but_logged_in_order() {
        let mut bracket = Bracket::new();
        bracket.add(2, "first");
        bracket.add(1, "one");
        bracket.add(2, "second");

        assert_eq!(bracket.len(), 2);
        assert_eq!(bracket.at(2).map(|n| *n.payload()), Some("first"));
        assert_eq!(bracket.insertion_order(), &[2, 1, 2]);
    }

    #[test]
    fn test_iter_is_ascending_and_restartable() {
        let mut bracket = Bracket::new();
        for position in [8, 3, 10, 1, 6, 14, 4, 7, 13] {
            bracket.add(position, position * 10);
        }
        let first: Vec<_> = bracket.iter().map(Node::position).collect();
        let second: Vec<_> = (&bracket).into_iter().map(Node::position).collect();
        assert_eq!(first, vec![1, 3, 4, 6, 7, 8, 10, 13, 14]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_iter_mut_visits_in_order() {
        let mut bracket = Bracket::new();
        for position in [2, 1, 3] {
            bracket.add(position, 0);
        }
        for (position, payload) in bracket.iter_mut() {
            *payload = position * 2;
        }
        let payloads: Vec<_> = bracket.iter().map(|n| *n.payload()).collect();
        assert_eq!(payloads, vec![2, 4, 6]);
    }

    #[test]
    fn test_seats_follow_insertion_order() {
        let mut bracket = Bracket::new();
        for position in [3, 4, 1, 2, 3] {
            bracket.add(position, ());
        }
        assert_eq!(positions(&bracket.seats()), vec![3, 4, 1, 2]);
        assert_eq!(positions(&bracket.to_vec()), vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_seats_put_unlogged_positions_last() {
        let mut bracket = Bracket::new();
        bracket.set_root(Some(
            Node::new(5, ()).with_left(Node::new(2, ())).with_right(Node::new(8, ())),
        ));
        bracket.add(9, ());
        assert_eq!(positions(&bracket.seats()), vec![9, 2, 5, 8]);
    }

    #[test]
    fn test_at_and_replace() {
        let mut bracket = Bracket::new();
        bracket.add(1, "a");
        bracket.add(2, "b");

        assert!(bracket.replace(2, "z"));
        assert_eq!(bracket.at(2).map(|n| *n.payload()), Some("z"));
        assert!(!bracket.replace(3, "c"));
        assert!(bracket.at(3).is_none());
        assert!(!bracket.contains(3));
    }

    #[test]
    fn test_seed_assigns_in_seed_order() {
        let mut bracket = Bracket::new();
        for position in 1..=4 {
            bracket.add(position, "");
        }
        bracket.set_seed_order(vec![4, 2, 1, 3]);
        bracket.seed(["A", "B", "C", "D"]).unwrap();

        let at = |p| bracket.at(p).map(|n| *n.payload());
        assert_eq!(at(4), Some("A"));
        assert_eq!(at(2), Some("B"));
        assert_eq!(at(1), Some("C"));
        assert_eq!(at(3), Some("D"));
    }

    #[test]
    fn test_seed_without_seed_order() {
        let mut bracket: Bracket<&str> = Bracket::new();
        bracket.add(1, "");
        let result = bracket.seed(["A"]);
        assert!(matches!(result, Err(BracketError::MissingSeedOrder)));
    }

    #[test]
    fn test_seed_overflow_mutates_nothing() {
        let mut bracket = Bracket::new();
        bracket.add(1, "");
        bracket.add(2, "");
        bracket.set_seed_order(vec![1, 2]);
        let before = bracket.clone();

        let result = bracket.seed(["A", "B", "C"]);
        assert!(matches!(
            result,
            Err(BracketError::SeedLimitExceeded {
                players: 3,
                slots: 2
            })
        ));
        assert_eq!(bracket, before);
    }

    #[test]
    fn test_seed_with_fewer_players_leaves_rest() {
        let mut bracket = Bracket::new();
        for position in 1..=3 {
            bracket.add(position, "empty");
        }
        bracket.set_seed_order(vec![3, 1, 2]);
        bracket.seed(["A"]).unwrap();

        assert_eq!(bracket.at(3).map(|n| *n.payload()), Some("A"));
        assert_eq!(bracket.at(1).map(|n| *n.payload()), Some("empty"));
        assert_eq!(bracket.at(2).map(|n| *n.payload()), Some("empty"));
    }

    #[test]
    fn test_seed_skips_missing_seats() {
        let mut bracket = Bracket::new();
        bracket.add(1, "");
        bracket.set_seed_order(vec![7, 1]);
        bracket.seed(["lost", "kept"]).unwrap();
        assert_eq!(bracket.at(1).map(|n| *n.payload()), Some("kept"));
        assert_eq!(bracket.len(), 1);
    }

    #[test]
    fn test_match_winner_propagates_both_seats() {
        let mut bracket = finals_bracket();
        assert!(bracket.match_winner(10));
        assert_eq!(bracket.at(20).map(|n| *n.payload()), Some("Alice"));
        assert_eq!(bracket.at(21).map(|n| *n.payload()), Some("Bob"));
    }

    #[test]
    fn test_match_loser_matches_winner_on_opponent() {
        let mut by_winner = finals_bracket();
        let mut by_loser = finals_bracket();
        assert!(by_winner.match_winner(10));
        assert!(by_loser.match_loser(11));
        assert_eq!(by_winner, by_loser);
    }

    #[test]
    fn test_unmatched_seat_reports_failure() {
        let mut bracket = finals_bracket();
        let before = bracket.clone();
        assert!(!bracket.match_winner(20));
        assert!(!bracket.match_loser(20));
        assert_eq!(bracket, before);
    }

    #[test]
    fn test_match_without_loser_destination() {
        let mut bracket = Bracket::new();
        bracket.add_match(Match::new(1, 2).with_winner_to(3));
        bracket.add(3, "TBD");
        bracket.add(1, "Carol");
        bracket.add(2, "Dave");

        assert!(bracket.match_loser(1));
        assert_eq!(bracket.at(3).map(|n| *n.payload()), Some("Dave"));
        assert_eq!(bracket.at(1).map(|n| *n.payload()), Some("Carol"));
    }

    #[test]
    fn test_tree_round_trip() {
        let mut bracket = Bracket::new();
        for position in [4, 2, 6, 1, 3, 5, 7] {
            bracket.add(position, format!("seat {position}"));
        }
        let rebuilt = Bracket::from_tree(bracket.to_tree().unwrap());
        assert_eq!(rebuilt.root(), bracket.root());
    }

    #[test]
    fn test_json_round_trip() {
        let mut bracket = Bracket::new();
        for position in [2, 1, 3] {
            bracket.add(position, position.to_string());
        }
        let json = bracket.to_json().unwrap();
        let rebuilt: Bracket<String> = Bracket::from_json(&json).unwrap();
        assert_eq!(rebuilt.to_tree(), bracket.to_tree());

        let empty: Bracket<String> = Bracket::from_json("null").unwrap();
        assert!(empty.is_empty());
        assert!(Bracket::<String>::from_json("{").is_err());
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entrant {
        name: String,
        rating: u32,
    }

    #[test]
    fn test_json_round_trip_without_default_payload() {
        let mut bracket = Bracket::new();
        for (position, name) in [(2, "Ann"), (1, "Bea"), (3, "Cat")] {
            bracket.add(
                position,
                Entrant {
                    name: name.to_string(),
                    rating: 1500,
                },
            );
        }
        let json = bracket.to_json().unwrap();
        let rebuilt: Bracket<Entrant> = Bracket::from_json(&json).unwrap();
        assert_eq!(rebuilt.root(), bracket.root());
        assert_eq!(rebuilt.at(1).map(|n| n.payload().name.as_str()), Some("Bea"));
    }

    /// Seats added in ascending order form a right-leaning chain
    fn chain(len: Position) -> Bracket<Position> {
        let mut bracket = Bracket::new();
        for position in 1..=len {
            bracket.add(position, position);
        }
        bracket
    }

    /// Same chain built directly, without the quadratic inserts
    fn prebuilt_chain(len: Position) -> Bracket<Position> {
        let mut node = Node::new(len, len);
        for position in (1..len).rev() {
            node = Node::new(position, position).with_right(node);
        }
        let mut bracket = Bracket::new();
        bracket.set_root(Some(node));
        bracket
    }

    #[test]
    fn test_chain_json_round_trip_past_nesting_limit() {
        let bracket = chain(200);
        let rebuilt: Bracket<Position> = Bracket::from_json(&bracket.to_json().unwrap()).unwrap();
        assert_eq!(rebuilt.len(), 200);
        assert_eq!(rebuilt.root(), bracket.root());
        assert_eq!(rebuilt.seats().len(), 200);
    }

    #[test]
    fn test_deep_chain_tree_round_trip() {
        let bracket = chain(2_000);
        let rebuilt = Bracket::from_tree(bracket.to_tree().unwrap());
        assert_eq!(rebuilt, bracket);

        let from_json: Bracket<Position> = Bracket::from_json(&bracket.to_json().unwrap()).unwrap();
        assert_eq!(from_json.root(), bracket.root());
    }

    #[test]
    fn test_deep_chain_export_clone_and_compare() {
        let bracket = prebuilt_chain(20_000);
        let tree = bracket.to_tree().unwrap();
        assert_eq!(tree.preorder().len(), 20_000);
        assert_eq!(Some(&tree), bracket.root().map(Node::export).as_ref());

        let json = bracket.to_json().unwrap();
        assert!(json.starts_with(r#"{"position":1,"payload":1,"right":{"position":2"#));

        let copy = bracket.clone();
        assert_eq!(copy, bracket);
        assert_eq!(copy.len(), 20_000);
    }

    #[test]
    fn test_deep_chain_drops() {
        let bracket = prebuilt_chain(200_000);
        assert_eq!(bracket.iter().last().map(Node::position), Some(200_000));
        drop(bracket);
    }
}
