use crate::{Input, ParseNode};
use ptree::TreeItem;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

impl ParseNode {
    /// Create a new parse tree node.
    pub fn new(
        name: Option<Rc<str>>,
        input: Input,
        start: usize,
        end: usize,
        children: Vec<ParseNode>,
        captures: Option<Vec<Option<(usize, usize)>>>,
    ) -> Self {
        Self {
            name,
            input,
            start,
            end,
            children,
            captures,
        }
    }

    /// Create a leaf node.
    pub fn leaf(name: Option<Rc<str>>, input: Input, start: usize, end: usize) -> Self {
        ParseNode::new(name, input, start, end, Vec::with_capacity(0), None)
    }

    /// The rule name this node was produced by, if any.
    pub fn rule_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The matched slice of the input text; [None] for token sequences.
    pub fn text(&self) -> Option<&str> {
        match &self.input {
            Input::Text(code) => Some(code.text().get(self.start..self.end).unwrap_or("")),
            Input::Tokens(_) => None,
        }
    }

    /// Find a node for a given rule name searching through all nested children.
    pub fn find_named(&self, name: &str) -> Option<&ParseNode> {
        if self.rule_name() == Some(name) {
            Some(self)
        } else {
            self.children.iter().find_map(|child| child.find_named(name))
        }
    }

    /// Search through all nested children and return the first match.
    pub fn find_tree<TF: Fn(&ParseNode) -> bool>(&self, p: &TF) -> Option<&ParseNode> {
        if p(self) {
            Some(self)
        } else {
            self.children.iter().find_map(|child| child.find_tree(p))
        }
    }

    /// Return all the nested nodes for a given rule name.
    pub fn list_named<'this>(&'this self, name: &str) -> Vec<&'this ParseNode> {
        let mut list: Vec<&'this ParseNode> = Vec::new();
        self.walk_tree(&mut |node| {
            if node.rule_name() == Some(name) {
                list.push(node);
            }
        });
        list
    }

    pub fn get_child(&self, name: &str) -> Option<&ParseNode> {
        self.children.iter().find(|child| child.rule_name() == Some(name))
    }

    pub fn contains_named(&self, name: &str) -> bool {
        self.find_named(name).is_some()
    }

    fn walk_tree<'this, TF: FnMut(&'this Self)>(&'this self, p: &mut TF) {
        p(self);
        self.children.iter().for_each(|child| child.walk_tree(p));
    }

    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl Debug for ParseNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug_struct = f.debug_struct("ParseNode");
        debug_struct
            .field("name", &self.rule_name().unwrap_or(""))
            .field("start", &self.start)
            .field("end", &self.end);
        if let Some(text) = self.text() {
            debug_struct.field("text", &text);
        }
        if !self.children.is_empty() {
            debug_struct.field("children", &self.children);
        }
        debug_struct.finish()
    }
}

impl PartialEq for ParseNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.start == other.start
            && self.end == other.end
            && self.captures == other.captures
            && self.children == other.children
    }
}

impl TreeItem for ParseNode {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self.rule_name() {
            Some(name) => write!(f, "{} # {}-{}", name, self.start, self.end),
            None => write!(f, "<anonymous> # {}-{}", self.start, self.end),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(&self.children)
    }
}

#[derive(Clone)]
/// A borrowed tree view that marks one node, used by visitation error dumps.
struct MarkedNode<'t> {
    node: &'t ParseNode,
    target: *const ParseNode,
}

impl<'t> TreeItem for MarkedNode<'t> {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, style: &ptree::Style) -> std::io::Result<()> {
        self.node.write_self(f, style)?;
        if std::ptr::eq(self.node, self.target) {
            write!(f, "   <-- error raised here")?;
        }
        Ok(())
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::Owned(
            self.node
                .children
                .iter()
                .map(|child| MarkedNode {
                    node: child,
                    target: self.target,
                })
                .collect(),
        )
    }
}

/// Render `root` with `target` marked, for [VisitationError](crate::VisitationError).
pub(crate) fn write_marked(root: &ParseNode, target: &ParseNode) -> String {
    let marked = MarkedNode {
        node: root,
        target,
    };
    let mut buffer: Vec<u8> = Vec::new();
    match ptree::write_tree(&marked, &mut buffer) {
        Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
        Err(_) => String::new(),
    }
}
