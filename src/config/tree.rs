//! Configuration tree model.
//!
//! # Responsibilities
//! - Own every section and pair of one load in a single arena
//! - Record parent links, source file and line for every item
//! - Hand out borrowing handles ([`SectionRef`], [`PairRef`], [`Item`])
//!
//! # Design Decisions
//! - Nodes are addressed by index; parents are indices, children are an
//!   ordered `Vec` of indices owned by the section
//! - Node 0 is always the root section
//! - The tree is immutable once the reader returns it; only the reader
//!   (crate-private API) appends or rolls back nodes

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::error::Location;
use crate::config::token::Operator;

/// Label given to sections declared without one, including every root.
pub const DEFAULT_SECTION_NAME: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);
}

/// An attribute/value binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub(crate) attribute: String,
    pub(crate) value: String,
    pub(crate) operator: Operator,
}

#[derive(Debug, Clone)]
pub(crate) struct SectionData {
    pub(crate) name1: String,
    pub(crate) name2: Option<String>,
    pub(crate) children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Pair(Pair),
    Section(SectionData),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    /// Position within the parent's children.
    pub(crate) index: usize,
    pub(crate) file: usize,
    pub(crate) line: usize,
    pub(crate) kind: NodeKind,
}

/// A parsed configuration file.
#[derive(Debug, Clone)]
pub struct ConfigTree {
    pub(crate) nodes: Vec<Node>,
    /// Source files; index 0 is the file the tree was loaded from.
    pub(crate) files: Vec<Arc<Path>>,
}

impl ConfigTree {
    pub(crate) fn new(file: Arc<Path>) -> Self {
        Self {
            nodes: Vec::new(),
            files: vec![file],
        }
    }

    /// The root section.
    pub fn root(&self) -> SectionRef<'_> {
        SectionRef {
            tree: self,
            id: NodeId::ROOT,
        }
    }

    /// The file this tree was loaded from.
    pub fn path(&self) -> &Path {
        &self.files[0]
    }

    /// The root when `name` is `None`, otherwise the first root subsection
    /// labelled `name`.
    pub fn section(&self, name: Option<&str>) -> Option<SectionRef<'_>> {
        match name {
            None => Some(self.root()),
            Some(name) => self.root().find_subsection(name),
        }
    }

    /// Number of items in the tree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn item(&self, id: NodeId) -> Item<'_> {
        match self.node(id).kind {
            NodeKind::Pair(_) => Item::Pair(PairRef { tree: self, id }),
            NodeKind::Section(_) => Item::Section(SectionRef { tree: self, id }),
        }
    }

    pub(crate) fn section_data(&self, id: NodeId) -> &SectionData {
        match &self.node(id).kind {
            NodeKind::Section(data) => data,
            NodeKind::Pair(_) => unreachable!("node {:?} is not a section", id),
        }
    }

    fn section_data_mut(&mut self, id: NodeId) -> &mut SectionData {
        match &mut self.nodes[id.0].kind {
            NodeKind::Section(data) => data,
            NodeKind::Pair(_) => unreachable!("node {:?} is not a section", id),
        }
    }

    pub(crate) fn location_of(&self, id: NodeId) -> Location {
        let node = self.node(id);
        Location::new(self.files[node.file].clone(), node.line)
    }

    // --- Building (reader only) ---

    /// Current arena length, for rolling back a failed section.
    pub(crate) fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node allocated since `mark`.
    pub(crate) fn truncate(&mut self, mark: usize) {
        self.nodes.truncate(mark);
    }

    /// Allocate a section that is not yet attached to its parent.
    ///
    /// The parent link is set immediately so variable lookups can walk
    /// outward while the section is still being read.
    pub(crate) fn alloc_section(
        &mut self,
        parent: Option<NodeId>,
        line: usize,
        name1: Option<&str>,
        name2: Option<&str>,
    ) -> NodeId {
        let name1 = match name1 {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => DEFAULT_SECTION_NAME.to_string(),
        };
        let name2 = name2.filter(|n| !n.is_empty()).map(str::to_string);
        self.push_node(Node {
            parent,
            index: 0,
            file: 0,
            line,
            kind: NodeKind::Section(SectionData {
                name1,
                name2,
                children: Vec::new(),
            }),
        })
    }

    /// Append a completed child section to `parent`.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        let index = self.section_data(parent).children.len();
        self.nodes[child.0].index = index;
        self.nodes[child.0].parent = Some(parent);
        self.section_data_mut(parent).children.push(child);
    }

    pub(crate) fn push_pair(&mut self, section: NodeId, line: usize, pair: Pair) -> NodeId {
        let id = self.push_node(Node {
            parent: Some(section),
            index: 0,
            file: 0,
            line,
            kind: NodeKind::Pair(pair),
        });
        self.attach(section, id);
        id
    }

    /// Copy every node of `other` into this arena and attach its root to
    /// `parent`. File indices and node indices are remapped.
    pub(crate) fn graft(&mut self, parent: NodeId, other: ConfigTree) -> NodeId {
        let node_offset = self.nodes.len();
        let file_map: Vec<usize> = other
            .files
            .into_iter()
            .map(|file| self.intern_file(file))
            .collect();

        for mut node in other.nodes {
            node.parent = node.parent.map(|p| NodeId(p.0 + node_offset));
            node.file = file_map[node.file];
            if let NodeKind::Section(data) = &mut node.kind {
                for child in &mut data.children {
                    child.0 += node_offset;
                }
            }
            self.nodes.push(node);
        }

        let root = NodeId(node_offset);
        self.attach(parent, root);
        root
    }

    fn intern_file(&mut self, file: Arc<Path>) -> usize {
        match self.files.iter().position(|f| *f == file) {
            Some(i) => i,
            None => {
                self.files.push(file);
                self.files.len() - 1
            }
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

/// Borrowed handle to a section of a [`ConfigTree`].
#[derive(Clone, Copy)]
pub struct SectionRef<'a> {
    pub(crate) tree: &'a ConfigTree,
    pub(crate) id: NodeId,
}

/// Borrowed handle to a pair of a [`ConfigTree`].
#[derive(Clone, Copy)]
pub struct PairRef<'a> {
    pub(crate) tree: &'a ConfigTree,
    pub(crate) id: NodeId,
}

/// Either kind of tree item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Item<'a> {
    Pair(PairRef<'a>),
    Section(SectionRef<'a>),
}

impl<'a> SectionRef<'a> {
    pub(crate) fn data(&self) -> &'a SectionData {
        self.tree.section_data(self.id)
    }

    pub fn name1(&self) -> &'a str {
        &self.data().name1
    }

    pub fn name2(&self) -> Option<&'a str> {
        self.data().name2.as_deref()
    }

    pub fn line(&self) -> usize {
        self.tree.node(self.id).line
    }

    pub fn file(&self) -> &'a Path {
        &self.tree.files[self.tree.node(self.id).file]
    }

    pub fn location(&self) -> Location {
        self.tree.location_of(self.id)
    }

    /// Enclosing section; `None` for the root.
    pub fn parent(&self) -> Option<SectionRef<'a>> {
        self.tree.node(self.id).parent.map(|id| SectionRef {
            tree: self.tree,
            id,
        })
    }
}

impl<'a> PairRef<'a> {
    fn pair(&self) -> &'a Pair {
        match &self.tree.node(self.id).kind {
            NodeKind::Pair(pair) => pair,
            NodeKind::Section(_) => unreachable!("node {:?} is not a pair", self.id),
        }
    }

    pub fn attribute(&self) -> &'a str {
        &self.pair().attribute
    }

    pub fn value(&self) -> &'a str {
        &self.pair().value
    }

    pub fn operator(&self) -> Operator {
        self.pair().operator
    }

    pub fn line(&self) -> usize {
        self.tree.node(self.id).line
    }

    pub fn file(&self) -> &'a Path {
        &self.tree.files[self.tree.node(self.id).file]
    }

    pub fn location(&self) -> Location {
        self.tree.location_of(self.id)
    }

    /// Section that owns this pair.
    pub fn parent(&self) -> SectionRef<'a> {
        let id = self
            .tree
            .node(self.id)
            .parent
            .unwrap_or(NodeId::ROOT);
        SectionRef {
            tree: self.tree,
            id,
        }
    }
}

impl<'a> Item<'a> {
    pub fn is_section(&self) -> bool {
        matches!(self, Item::Section(_))
    }

    pub fn as_pair(&self) -> Option<PairRef<'a>> {
        match self {
            Item::Pair(p) => Some(*p),
            Item::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<SectionRef<'a>> {
        match self {
            Item::Section(s) => Some(*s),
            Item::Pair(_) => None,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Item::Pair(p) => p.line(),
            Item::Section(s) => s.line(),
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Item::Pair(p) => p.location(),
            Item::Section(s) => s.location(),
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        match self {
            Item::Pair(p) => p.id,
            Item::Section(s) => s.id,
        }
    }

    pub(crate) fn parent_id(&self) -> Option<NodeId> {
        match self {
            Item::Pair(p) => p.tree.node(p.id).parent,
            Item::Section(s) => s.tree.node(s.id).parent,
        }
    }
}

impl PartialEq for SectionRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SectionRef<'_> {}

impl PartialEq for PairRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for PairRef<'_> {}

impl fmt::Debug for SectionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionRef")
            .field("name1", &self.name1())
            .field("name2", &self.name2())
            .field("line", &self.line())
            .finish()
    }
}

impl fmt::Debug for PairRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairRef")
            .field("attribute", &self.attribute())
            .field("value", &self.value())
            .field("line", &self.line())
            .finish()
    }
}
