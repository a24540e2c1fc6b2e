//! Contracts whose signatures name handles: `Self`, sibling contracts, and
//! borrowing library types.

use std::borrow::Cow;

use tola_dyn::prelude::*;

interface! {
    pub Node {
        fn value(&self) -> u32;
        fn child(&self, index: usize) -> Option<Self>;
        fn adopt(&mut self, child: Self);
        fn leaf(&self) -> Leaf;
        fn label(&self) -> Cow<'_, str>;
    }

    pub Leaf {
        fn value(&self) -> u32;
    }
}

#[derive(Clone, Default)]
struct Tree {
    value: u32,
    children: Vec<Node<'static>>,
}

impl Tree {
    fn new(value: u32) -> Self {
        Tree { value, children: Vec::new() }
    }

    fn value(&self) -> u32 {
        self.value
    }

    fn child(&self, index: usize) -> Option<Node<'static>> {
        self.children.get(index).cloned()
    }

    fn adopt(&mut self, child: Node<'static>) {
        self.children.push(child);
    }

    fn leaf(&self) -> Leaf<'static> {
        Leaf!(Tree::new(self.value))
    }

    fn label(&self) -> Cow<'_, str> {
        if self.children.is_empty() {
            Cow::Borrowed("leaf")
        } else {
            Cow::Owned(format!("node/{}", self.children.len()))
        }
    }
}

// ============================================================================
// Self in Signatures
// ============================================================================

#[test]
fn test_contract_returns_its_own_handle() {
    let mut root = Node!(Tree::new(1));
    root.adopt(Node!(Tree::new(2)));
    root.adopt(Node!(Tree::new(3)));

    let second = root.child(1).unwrap();
    assert_eq!(second.value(), 3);
    assert!(root.child(2).is_none());
}

#[test]
fn test_returned_handles_are_copies() {
    let mut root = Node!(Tree::new(1));
    root.adopt(Node!(Tree::new(2)));

    let mut first = root.child(0).unwrap();
    first.adopt(Node!(Tree::new(9)));

    assert!(root.child(0).unwrap().child(0).is_none());
    assert_eq!(first.child(0).map(|n| n.value()), Some(9));
}

#[test]
fn test_nested_payload_is_recovered() {
    let mut root = Node!(Tree::new(1));
    root.adopt(Node!(Tree::new(2)));

    let tree = root.into_target::<Tree>().ok().unwrap();
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].target::<Tree>().map(|t| t.value), Some(2));
}

// ============================================================================
// Sibling Handles and Borrowed Outputs
// ============================================================================

#[test]
fn test_contract_returns_a_sibling_handle() {
    let root = Node!(Tree::new(7));
    let leaf = root.leaf();
    assert_eq!(leaf.value(), 7);
    assert!(leaf.target::<Tree>().is_some());
}

#[test]
fn test_cow_output_borrows_from_the_payload() {
    let mut root = Node!(Tree::new(1));
    assert_eq!(root.label(), "leaf");
    assert!(matches!(root.label(), Cow::Borrowed(_)));

    root.adopt(Node!(Tree::new(2)));
    assert_eq!(root.label(), "node/1");
}

#[test]
fn test_recursive_contract_narrows() {
    let root = Node!(Tree::new(4));
    let leaf: Leaf = root.into_narrow();
    assert_eq!(leaf.value(), 4);
}
