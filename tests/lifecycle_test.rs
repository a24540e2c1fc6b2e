//! Payload lifetime management: drops, clones, layout and panics.

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tola_dyn::prelude::*;
use tola_dyn::Lifecycle;

interface! {
    pub Probe {
        fn id(&self) -> u32;
    }
}

// ============================================================================
// Drop Accounting
// ============================================================================

#[derive(Default)]
struct Counts {
    clones: Cell<u32>,
    drops: Cell<u32>,
}

struct Tracked {
    id: u32,
    counts: Rc<Counts>,
    panic_on_clone: bool,
}

impl Tracked {
    fn new(id: u32, counts: &Rc<Counts>) -> Self {
        Tracked { id, counts: counts.clone(), panic_on_clone: false }
    }

    fn id(&self) -> u32 {
        self.id
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if self.panic_on_clone {
            panic!("clone failed");
        }
        self.counts.clones.set(self.counts.clones.get() + 1);
        Tracked { id: self.id, counts: self.counts.clone(), panic_on_clone: false }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counts.drops.set(self.counts.drops.get() + 1);
    }
}

#[test]
fn test_payload_is_dropped_once() {
    let counts = Rc::new(Counts::default());
    let handle = Probe!(Tracked::new(1, &counts));
    assert_eq!(counts.drops.get(), 0);

    drop(handle);
    assert_eq!(counts.drops.get(), 1);
}

#[test]
fn test_clone_copies_and_both_are_dropped() {
    let counts = Rc::new(Counts::default());
    let handle = Probe!(Tracked::new(1, &counts));
    let copy = handle.clone();

    assert_eq!(counts.clones.get(), 1);
    drop(handle);
    drop(copy);
    assert_eq!(counts.drops.get(), 2);
}

#[test]
fn test_reassignment_drops_the_old_payload() {
    let counts = Rc::new(Counts::default());
    let mut handle = Probe!(Tracked::new(1, &counts));
    assert_eq!(handle.id(), 1);

    handle = Probe!(Tracked::new(2, &counts));
    assert_eq!(counts.drops.get(), 1);
    assert_eq!(handle.id(), 2);
}

#[test]
fn test_take_moves_without_drop() {
    let counts = Rc::new(Counts::default());
    let mut handle = Probe!(Tracked::new(1, &counts));
    let taken = handle.take();

    assert_eq!(counts.drops.get(), 0);
    drop(handle);
    assert_eq!(counts.drops.get(), 0);
    drop(taken);
    assert_eq!(counts.drops.get(), 1);
}

#[test]
fn test_into_target_skips_the_handle_drop() {
    let counts = Rc::new(Counts::default());
    let handle = Probe!(Tracked::new(3, &counts));

    let value = handle.into_target::<Tracked>().ok().unwrap();
    assert_eq!(counts.drops.get(), 0);
    assert_eq!(value.id, 3);
    drop(value);
    assert_eq!(counts.drops.get(), 1);
}

#[test]
fn test_panicking_clone_leaves_the_source_intact() {
    let counts = Rc::new(Counts::default());
    let mut tracked = Tracked::new(9, &counts);
    tracked.panic_on_clone = true;
    let handle = Probe!(tracked);

    let result = catch_unwind(AssertUnwindSafe(|| handle.clone()));
    assert!(result.is_err());

    assert_eq!(handle.id(), 9);
    assert_eq!(counts.drops.get(), 0);
    drop(handle);
    assert_eq!(counts.drops.get(), 1);
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Clone)]
struct Marker;

impl Marker {
    fn id(&self) -> u32 {
        0
    }
}

#[derive(Clone)]
#[repr(align(128))]
struct Wide {
    id: u32,
}

impl Wide {
    fn id(&self) -> u32 {
        self.id
    }
}

#[test]
fn test_zero_sized_payloads() {
    let handle = Probe!(Marker);
    assert_eq!(handle.id(), 0);
    assert!(handle.target::<Marker>().is_some());
    assert_eq!(handle.raw().lifecycle().unwrap().size(), 0);

    let copy = handle.clone();
    assert_eq!(copy.id(), 0);
}

#[test]
fn test_over_aligned_payloads() {
    let handles: Vec<Probe> = (0..8).map(|id| Probe!(Wide { id })).collect();
    for (id, handle) in handles.iter().enumerate() {
        let wide = handle.target::<Wide>().unwrap();
        assert_eq!(wide as *const Wide as usize % 128, 0);
        assert_eq!(handle.id(), id as u32);
    }
}

#[test]
fn test_lifecycle_descriptors() {
    let handle = Probe!(Wide { id: 1 });
    let lifecycle = handle.raw().lifecycle().unwrap();

    assert_eq!(lifecycle.type_id(), Lifecycle::of_value::<Wide>().type_id());
    assert_eq!(lifecycle.layout(), std::alloc::Layout::new::<Wide>());
    assert!(lifecycle.is::<Wide>());
    assert!(lifecycle.is_cloneable());
    assert!(!lifecycle.is_reference());

    let text = format!("{:?}", lifecycle);
    assert!(text.contains("align: 128"));
}
