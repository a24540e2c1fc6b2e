//! Recovering the concrete payload from a handle.

use tola_dyn::prelude::*;

interface! {
    pub Named {
        fn name(&self) -> String;
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Dog {
    name: String,
}

impl Dog {
    fn name(&self) -> String {
        self.name.clone()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Robot(u32);

impl Robot {
    fn name(&self) -> String {
        format!("unit-{}", self.0)
    }
}

fn dog(name: &str) -> Named<'static> {
    Named!(Dog { name: name.to_owned() })
}

// ============================================================================
// Borrowing
// ============================================================================

#[test]
fn test_target_matches_only_the_wrapped_type() {
    let handle = dog("rex");
    assert_eq!(handle.target::<Dog>().map(|d| d.name.as_str()), Some("rex"));
    assert!(handle.target::<Robot>().is_none());
    assert!(handle.target::<String>().is_none());
}

#[test]
fn test_target_mut_edits_in_place() {
    let mut handle = Named!(Robot(1));
    handle.target_mut::<Robot>().unwrap().0 = 42;
    assert_eq!(handle.name(), "unit-42");
    assert!(handle.target_mut::<Dog>().is_none());
}

#[test]
fn test_target_on_an_empty_handle() {
    let mut handle = Named::default();
    assert!(handle.target::<Dog>().is_none());
    assert!(handle.target_mut::<Dog>().is_none());
}

#[test]
fn test_primitive_payloads() {
    interface! { Bits { fn count_ones(&self) -> u32; } }

    let handle = Bits!(0b1011u8);
    assert_eq!(handle.count_ones(), 3);
    assert_eq!(handle.target::<u8>(), Some(&0b1011));
    assert!(handle.target::<u16>().is_none());
}

// ============================================================================
// Moving Out
// ============================================================================

#[test]
fn test_into_target_moves_the_payload_out() {
    let handle = dog("fido");
    let back: Dog = handle.into_target().unwrap();
    assert_eq!(back, Dog { name: "fido".into() });
}

#[test]
fn test_into_target_hands_the_handle_back_on_mismatch() {
    let handle = dog("fido");
    let handle = handle.into_target::<Robot>().unwrap_err();
    assert_eq!(handle.name(), "fido");
    assert_eq!(handle.into_target::<Dog>().unwrap().name, "fido");
}

#[test]
fn test_into_target_of_a_reference_handle_fails() {
    let d = Dog { name: "ref".into() };
    let handle = Named!(&d);
    let handle = handle.into_target::<Dog>().unwrap_err();
    assert_eq!(handle.name(), "ref");
}

#[test]
fn test_into_target_of_an_empty_handle_fails() {
    assert!(Named::default().into_target::<Dog>().unwrap_err().is_empty());
}

// ============================================================================
// Heterogeneous Lookup
// ============================================================================

#[test]
fn test_filtering_a_collection_by_type() {
    let zoo = vec![dog("a"), Named!(Robot(7)), dog("b"), Named!(Robot(9))];

    let robots: Vec<u32> = zoo.iter().filter_map(|h| h.target::<Robot>()).map(|r| r.0).collect();
    let names: Vec<String> = zoo.iter().map(Named::name).collect();

    assert_eq!(robots, vec![7, 9]);
    assert_eq!(names, vec!["a", "unit-7", "b", "unit-9"]);
}
