//! Parse trees as read-only arenas.
//!
//! A tree is built once per sentence and then shared by every hypothesis
//! for that sentence. Nodes are addressed by [`NodeId`]. The nodes that may
//! carry a mention are fixed when the tree is built, and each is given a
//! dense mention index so hypotheses can store their mentions in a flat
//! vector.
//!
//! Trees are read from bracketed text. A child whose tag ends in `^` is the
//! head of its parent; without a marker the last child is the head.
//!
//! ```text
//! (S (NP^ (DT the) (NN^ company)) (VP^ (VBD grew)))
//! ```

use std::fmt;

use crate::{
    error::DecodeError,
    rules::LanguageRules,
    sexp::{self, Sexp},
};

const HEAD_MARKER: char = '^';

/// Position of a node in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of a parse tree. Terminals carry the word as their tag.
#[derive(Debug, Clone, PartialEq)]
pub struct SynNode {
    tag: String,
    terminal: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    head: usize,
    start_token: usize,
    end_token: usize,
}

impl SynNode {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Index of the head among the children.
    pub fn head_index(&self) -> usize {
        self.head
    }

    pub fn head(&self) -> Option<NodeId> {
        self.children.get(self.head).copied()
    }

    pub fn start_token(&self) -> usize {
        self.start_token
    }

    pub fn end_token(&self) -> usize {
        self.end_token
    }
}

/// An immutable parse tree with its mention-bearing nodes indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    nodes: Vec<SynNode>,
    root: NodeId,
    mention_index: Vec<Option<usize>>,
    mention_nodes: Vec<NodeId>,
}

impl ParseTree {
    /// Read a tree from bracketed text, marking mention nodes with `rules`.
    pub fn parse(text: &str, rules: &LanguageRules) -> Result<Self, DecodeError> {
        let sexp = sexp::parse_one(text).map_err(DecodeError::MalformedTree)?;
        ParseTree::from_sexp(&sexp, rules)
    }

    pub fn from_sexp(sexp: &Sexp, rules: &LanguageRules) -> Result<Self, DecodeError> {
        let mut builder = Builder::default();
        let root = builder.node(sexp, None)?;
        let n_nodes = builder.nodes.len();
        let mut tree = ParseTree {
            nodes: builder.nodes,
            root,
            mention_index: vec![None; n_nodes],
            mention_nodes: Vec::new(),
        };

        let candidates: Vec<NodeId> = tree
            .preorder()
            .filter(|&node| rules.can_be_mention(&tree, node))
            .collect();
        for node in candidates {
            tree.mention_index[node.0] = Some(tree.mention_nodes.len());
            tree.mention_nodes.push(node);
        }

        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SynNode {
        &self.nodes[id.0]
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn head(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].head()
    }

    pub fn is_terminal(&self, id: NodeId) -> bool {
        self.nodes[id.0].terminal
    }

    /// A node whose only child is a terminal.
    pub fn is_preterminal(&self, id: NodeId) -> bool {
        let children = self.children(id);
        children.len() == 1 && self.is_terminal(children[0])
    }

    /// Follow head links down to the preterminal over the head word.
    pub fn head_preterminal(&self, id: NodeId) -> NodeId {
        let mut current = id;
        loop {
            if self.is_terminal(current) {
                return self.parent(current).unwrap_or(current);
            }
            if self.is_preterminal(current) {
                return current;
            }
            match self.head(current) {
                Some(head) => current = head,
                None => return current,
            }
        }
    }

    /// The word reached by following head links.
    pub fn head_word(&self, id: NodeId) -> &str {
        let mut current = id;
        while let Some(head) = self.head(current) {
            current = head;
        }
        &self.nodes[current.0].tag
    }

    pub fn start_token(&self, id: NodeId) -> usize {
        self.nodes[id.0].start_token
    }

    pub fn end_token(&self, id: NodeId) -> usize {
        self.nodes[id.0].end_token
    }

    /// The terminal words under a node.
    pub fn words(&self, id: NodeId) -> Vec<&str> {
        let mut words = Vec::new();
        self.collect_words(id, &mut words);
        words
    }

    fn collect_words<'a>(&'a self, id: NodeId, words: &mut Vec<&'a str>) {
        if self.is_terminal(id) {
            words.push(&self.nodes[id.0].tag);
        }
        for &child in self.children(id) {
            self.collect_words(child, words);
        }
    }

    /// The words under a node joined by single spaces.
    pub fn text(&self, id: NodeId) -> String {
        self.words(id).join(" ")
    }

    pub fn n_tokens(&self) -> usize {
        self.end_token(self.root) + 1
    }

    /// Nodes in pre-order, parents before children.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(self.children(node).iter().rev().copied());
            Some(node)
        })
    }

    /// Nodes in post-order, children before parents.
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
            } else {
                stack.push((node, true));
                for &child in self.children(node).iter().rev() {
                    stack.push((child, false));
                }
            }
        }
        order
    }

    pub fn mention_index(&self, id: NodeId) -> Option<usize> {
        self.mention_index[id.0]
    }

    pub fn has_mention(&self, id: NodeId) -> bool {
        self.mention_index[id.0].is_some()
    }

    /// Mention-bearing nodes in mention-index order.
    pub fn mention_nodes(&self) -> &[NodeId] {
        &self.mention_nodes
    }

    /// The smallest node spanning exactly `start..=end`, preferring the
    /// highest such node.
    pub fn node_spanning(&self, start: usize, end: usize) -> Option<NodeId> {
        self.preorder().find(|&node| {
            self.start_token(node) == start && self.end_token(node) == end
        })
    }
}

#[derive(Default)]
struct Builder {
    nodes: Vec<SynNode>,
    next_token: usize,
}

impl Builder {
    fn node(&mut self, sexp: &Sexp, parent: Option<NodeId>) -> Result<NodeId, DecodeError> {
        let items = sexp.as_list().ok_or_else(|| {
            DecodeError::MalformedTree(format!("expected a bracketed node, found {sexp:?}"))
        })?;
        let (tag, rest) = match items.split_first() {
            Some((Sexp::Atom(tag), rest)) if !rest.is_empty() => (tag, rest),
            _ => {
                return Err(DecodeError::MalformedTree(
                    "every node needs a tag and at least one child".to_string(),
                ));
            }
        };

        let id = self.push(tag.trim_end_matches(HEAD_MARKER), false, parent);
        let start = self.next_token;

        let mut head = None;
        for (position, child) in rest.iter().enumerate() {
            match child {
                Sexp::Atom(word) if rest.len() == 1 => {
                    let token = self.next_token;
                    let terminal = self.push(word, true, Some(id));
                    self.nodes[terminal.0].start_token = token;
                    self.nodes[terminal.0].end_token = token;
                    self.next_token += 1;
                    self.nodes[id.0].children.push(terminal);
                }
                Sexp::Atom(word) => {
                    return Err(DecodeError::MalformedTree(format!(
                        "bare word '{word}' beside other children of '{tag}'"
                    )));
                }
                Sexp::List(grandchildren) => {
                    let marked = matches!(
                        grandchildren.first(),
                        Some(Sexp::Atom(child_tag)) if child_tag.ends_with(HEAD_MARKER)
                    );
                    if marked && head.replace(position).is_some() {
                        return Err(DecodeError::MalformedTree(format!(
                            "node '{tag}' marks more than one head"
                        )));
                    }
                    let child_id = self.node(child, Some(id))?;
                    self.nodes[id.0].children.push(child_id);
                }
            }
        }

        let n_children = self.nodes[id.0].children.len();
        let node = &mut self.nodes[id.0];
        node.head = head.unwrap_or(n_children - 1);
        node.start_token = start;
        node.end_token = self.next_token - 1;
        Ok(id)
    }

    fn push(&mut self, tag: &str, terminal: bool, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SynNode {
            tag: tag.to_string(),
            terminal,
            parent,
            children: Vec::new(),
            head: 0,
            start_token: 0,
            end_token: 0,
        });
        id
    }
}
