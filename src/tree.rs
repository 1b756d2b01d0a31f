//! Prefix-code tree: greedy construction from symbol frequencies, per-node
//! code assignment, and the self-delimiting textual header form.
//!
//! The tree lives in an arena (`Vec<Node>` indexed by `NodeId`) and every
//! traversal runs on an explicit stack, so header depth never turns into
//! call depth.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::error::FormatError;

const LEAF_MARKER: char = '1';
const INTERNAL_MARKER: char = '0';
const ABSENT_MARKER: char = '#';

pub type NodeId = usize;

/// Root-to-node path: `false` = left, `true` = right.
pub type Code = Vec<bool>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: char,
        freq: u64,
        code: Code,
    },
    Internal {
        freq: u64,
        left: NodeId,
        right: NodeId,
        code: Code,
    },
}

/// One symbol's slot in the code table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub code: Code,
    pub freq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    /// Greedy two-way merge: repeatedly join the two lowest-frequency nodes
    /// until one root remains. Leaves are seeded in ascending symbol order
    /// and the heap breaks frequency ties on node id, so equal-frequency
    /// merges are reproducible across runs.
    pub fn from_frequencies(freq: &HashMap<char, u64>) -> Self {
        let mut symbols: Vec<(char, u64)> = freq.iter().map(|(&s, &f)| (s, f)).collect();
        symbols.sort_by_key(|&(symbol, _)| symbol);

        let mut nodes: Vec<Node> = Vec::with_capacity(2 * symbols.len());
        let mut heap: BinaryHeap<(Reverse<u64>, Reverse<NodeId>, NodeId)> = symbols
            .into_iter()
            .map(|(symbol, f)| {
                let id = nodes.len();
                nodes.push(Node::Leaf {
                    symbol,
                    freq: f,
                    code: Code::new(),
                });
                (Reverse(f), Reverse(id), id)
            })
            .collect();

        while heap.len() > 1 {
            let (Reverse(f1), _, left) = heap.pop().unwrap();
            let (Reverse(f2), _, right) = heap.pop().unwrap();
            let id = nodes.len();
            nodes.push(Node::Internal {
                freq: f1 + f2,
                left,
                right,
                code: Code::new(),
            });
            heap.push((Reverse(f1 + f2), Reverse(id), id));
        }

        let root = heap.pop().map(|(_, _, id)| id);
        let mut tree = Self { nodes, root };
        tree.assign_codes();
        tree
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Top-down code assignment: a left child appends `false` to its
    /// parent's code, a right child `true`; the root's code is empty.
    /// A single-leaf tree gets the explicit 1-bit code `[false]` so the
    /// degenerate alphabet still round-trips.
    fn assign_codes(&mut self) {
        let Some(root) = self.root else { return };

        if let Node::Leaf { code, .. } = &mut self.nodes[root] {
            *code = vec![false];
            return;
        }

        let mut stack: Vec<(NodeId, Code)> = vec![(root, Code::new())];
        while let Some((id, prefix)) = stack.pop() {
            let children = match &self.nodes[id] {
                Node::Internal { left, right, .. } => Some((*left, *right)),
                Node::Leaf { .. } => None,
            };
            if let Some((left, right)) = children {
                let mut left_code = prefix.clone();
                left_code.push(false);
                let mut right_code = prefix.clone();
                right_code.push(true);
                stack.push((right, right_code));
                stack.push((left, left_code));
            }
            match &mut self.nodes[id] {
                Node::Leaf { code, .. } | Node::Internal { code, .. } => *code = prefix,
            }
        }
    }

    /// One traversal collecting every leaf's code and frequency.
    pub fn code_table(&self) -> HashMap<char, CodeEntry> {
        let mut table = HashMap::new();
        let Some(root) = self.root else { return table };

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match &self.nodes[id] {
                Node::Leaf { symbol, freq, code } => {
                    table.insert(
                        *symbol,
                        CodeEntry {
                            code: code.clone(),
                            freq: *freq,
                        },
                    );
                }
                Node::Internal { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
        table
    }

    /// Pre-order textual form: absent root -> `#`, leaf -> `1` + symbol,
    /// internal -> `0` + left + right. Self-delimiting: an internal marker
    /// consumes exactly two subtrees and a leaf marker exactly one symbol.
    pub fn serialize(&self) -> String {
        let Some(root) = self.root else {
            return ABSENT_MARKER.to_string();
        };

        let mut out = String::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match &self.nodes[id] {
                Node::Leaf { symbol, .. } => {
                    out.push(LEAF_MARKER);
                    out.push(*symbol);
                }
                Node::Internal { left, right, .. } => {
                    out.push(INTERNAL_MARKER);
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
        out
    }

    /// Rebuilds a tree from its serialized header and re-assigns codes
    /// (the header does not carry them).
    ///
    /// `#` alone is the empty tree. Anything that cannot be a strict binary
    /// tree is rejected: an interior `#`, a leaf marker with no symbol, an
    /// unknown marker, input ending with unfilled children, or characters
    /// left over after the tree completes.
    pub fn deserialize(header: &str) -> Result<Self, FormatError> {
        let mut nodes: Vec<Node> = Vec::new();
        // internal nodes still waiting for children; bool = left child filled
        let mut pending: Vec<(NodeId, bool)> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut complete = false;

        let mut chars = header.chars();
        while let Some(marker) = chars.next() {
            if complete {
                return Err(FormatError::MalformedTree);
            }

            let done = match marker {
                INTERNAL_MARKER => {
                    let id = nodes.len();
                    nodes.push(Node::Internal {
                        freq: 0,
                        left: 0,
                        right: 0,
                        code: Code::new(),
                    });
                    pending.push((id, false));
                    continue;
                }
                LEAF_MARKER => {
                    let symbol = chars.next().ok_or(FormatError::MalformedTree)?;
                    let id = nodes.len();
                    nodes.push(Node::Leaf {
                        symbol,
                        freq: 0,
                        code: Code::new(),
                    });
                    id
                }
                ABSENT_MARKER if nodes.is_empty() && pending.is_empty() => {
                    complete = true;
                    continue;
                }
                _ => return Err(FormatError::MalformedTree),
            };

            // `done` is a finished subtree: attach it upward, closing any
            // ancestor whose right child it completes.
            let mut done = done;
            loop {
                let Some(&(parent, filled)) = pending.last() else {
                    root = Some(done);
                    complete = true;
                    break;
                };
                if !filled {
                    if let Some(slot) = pending.last_mut() {
                        slot.1 = true;
                    }
                    if let Node::Internal { left, .. } = &mut nodes[parent] {
                        *left = done;
                    }
                    break;
                }
                if let Node::Internal { right, .. } = &mut nodes[parent] {
                    *right = done;
                }
                pending.pop();
                done = parent;
            }
        }

        if !complete {
            return Err(FormatError::MalformedTree);
        }

        let mut tree = Self { nodes, root };
        tree.assign_codes();
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq_of(pairs: &[(char, u64)]) -> HashMap<char, u64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn skewed_frequencies_give_short_code_to_common_symbol() {
        let tree = Tree::from_frequencies(&freq_of(&[('A', 5), ('B', 2), ('C', 1)]));
        let table = tree.code_table();

        assert_eq!(table[&'A'].code.len(), 1);
        assert_eq!(table[&'B'].code.len(), 2);
        assert_eq!(table[&'C'].code.len(), 2);
        // B and C hang off the same internal node
        assert_eq!(table[&'B'].code[0], table[&'C'].code[0]);

        // "AAAAABBC" packs into 11 payload bits, well under 8 bits a symbol
        let bits = 5 * table[&'A'].code.len() + 2 * table[&'B'].code.len() + table[&'C'].code.len();
        assert_eq!(bits, 11);
        assert!(bits < 64);
    }

    #[test]
    fn equal_frequency_builds_are_reproducible() {
        let freq = freq_of(&[('x', 2), ('y', 2), ('z', 2), ('w', 2)]);
        let first = Tree::from_frequencies(&freq).serialize();
        for _ in 0..10 {
            assert_eq!(Tree::from_frequencies(&freq).serialize(), first);
        }
    }

    #[test]
    fn no_code_prefixes_another() {
        let tree = Tree::from_frequencies(&freq_of(&[
            ('a', 9),
            ('b', 5),
            ('c', 3),
            ('d', 2),
            ('e', 1),
        ]));
        let table = tree.code_table();
        let codes: Vec<&Code> = table.values().map(|entry| &entry.code).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{a:?} prefixes {b:?}");
                }
            }
        }
    }

    #[test]
    fn single_symbol_gets_one_bit_code() {
        let tree = Tree::from_frequencies(&freq_of(&[('A', 8)]));
        assert_eq!(tree.code_table()[&'A'].code, vec![false]);
    }

    #[test]
    fn serialized_shapes() {
        assert_eq!(Tree::from_frequencies(&HashMap::new()).serialize(), "#");
        assert_eq!(Tree::from_frequencies(&freq_of(&[('A', 8)])).serialize(), "1A");
        assert_eq!(
            Tree::from_frequencies(&freq_of(&[('A', 5), ('B', 2), ('C', 1)])).serialize(),
            "001C1B1A"
        );
    }

    #[test]
    fn header_roundtrip_preserves_shape_and_codes() {
        let freq = freq_of(&[
            ('h', 1),
            ('e', 1),
            ('l', 3),
            ('o', 2),
            (' ', 1),
            ('w', 1),
            ('r', 1),
            ('d', 1),
        ]);
        let tree = Tree::from_frequencies(&freq);
        let rebuilt = Tree::deserialize(&tree.serialize()).unwrap();

        assert_eq!(rebuilt.serialize(), tree.serialize());

        let original = tree.code_table();
        let restored = rebuilt.code_table();
        assert_eq!(original.len(), restored.len());
        for (symbol, entry) in &original {
            assert_eq!(restored[symbol].code, entry.code, "code mismatch for {symbol:?}");
        }
    }

    #[test]
    fn marker_characters_survive_as_symbols() {
        let tree = Tree::from_frequencies(&freq_of(&[('#', 3), ('0', 2), ('1', 1)]));
        let rebuilt = Tree::deserialize(&tree.serialize()).unwrap();
        assert_eq!(rebuilt.serialize(), tree.serialize());
    }

    #[test]
    fn deserialize_empty_tree() {
        let tree = Tree::deserialize("#").unwrap();
        assert!(tree.root().is_none());
        assert!(tree.code_table().is_empty());
    }

    #[test]
    fn deserialize_rejects_malformed_headers() {
        for bad in ["", "0", "01A", "1", "2", "0#1A", "1A1B", "#1A", "#0", "011"] {
            assert_eq!(
                Tree::deserialize(bad),
                Err(FormatError::MalformedTree),
                "{bad:?}"
            );
        }
    }
}
