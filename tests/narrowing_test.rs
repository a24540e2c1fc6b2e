//! Conversion between contracts whose methods are a subset of each other.

use std::cell::Cell;
use std::rc::Rc;

use tola_dyn::prelude::*;
use tola_dyn::Error;

interface! {
    pub Shape {
        fn area(&self) -> f64;
        fn perimeter(&self) -> f64;
        fn scale(&mut self, factor: f64);
    }

    pub Area {
        fn area(&self) -> f64;
    }

    /// Same methods as `Shape`, declared in a different order.
    pub Figure {
        fn scale(&mut self, factor: f64);
        fn area(&self) -> f64;
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Square {
    side: f64,
}

impl Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }

    fn perimeter(&self) -> f64 {
        4.0 * self.side
    }

    fn scale(&mut self, factor: f64) {
        self.side *= factor;
    }
}

// ============================================================================
// By Move
// ============================================================================

#[test]
fn test_narrowing_preserves_behaviour() {
    let shape = Shape!(Square { side: 3.0 });
    let area: Area = shape.into_narrow();

    assert_eq!(area.area(), 9.0);
    assert_eq!(area.target::<Square>(), Some(&Square { side: 3.0 }));
}

#[test]
fn test_narrowing_matches_methods_by_name_not_position() {
    let shape = Shape!(Square { side: 2.0 });
    let mut figure: Figure = shape.into_narrow();

    figure.scale(3.0);
    assert_eq!(figure.area(), 36.0);
}

#[test]
fn test_narrowing_chains() {
    let shape = Shape!(Square { side: 1.5 });
    let figure: Figure = shape.into_narrow();
    let area: Area = figure.into_narrow();
    assert_eq!(area.area(), 2.25);
}

#[test]
fn test_reflexive_narrowing() {
    let shape = Shape!(Square { side: 1.0 });
    let same: Shape = shape.into_narrow();
    assert_eq!(same.perimeter(), 4.0);
}

#[test]
fn test_narrowing_an_empty_handle_yields_an_empty_handle() {
    let area: Area = Shape::default().into_narrow();
    assert!(area.is_empty());
    assert_eq!(area, Area::default());
}

#[test]
#[should_panic(expected = "called `Area::area` on an empty handle")]
fn test_narrowed_empty_handles_report_the_target_contract() {
    let area: Area = Shape::default().into_narrow();
    area.area();
}

#[test]
fn test_narrowing_moves_without_cloning_or_dropping() {
    #[derive(Debug)]
    struct Probe {
        clones: Rc<Cell<u32>>,
        drops: Rc<Cell<u32>>,
    }

    impl Clone for Probe {
        fn clone(&self) -> Self {
            self.clones.set(self.clones.get() + 1);
            Probe { clones: self.clones.clone(), drops: self.drops.clone() }
        }
    }

    impl Drop for Probe {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    impl Probe {
        fn area(&self) -> f64 {
            1.0
        }
    }

    interface! { Unit { fn area(&self) -> f64; } }

    let clones = Rc::new(Cell::new(0));
    let drops = Rc::new(Cell::new(0));
    let handle = Unit!(Probe { clones: clones.clone(), drops: drops.clone() });

    let area: Area = handle.into_narrow();
    assert_eq!((clones.get(), drops.get()), (0, 0));

    drop(area);
    assert_eq!((clones.get(), drops.get()), (0, 1));
}

// ============================================================================
// By Copy
// ============================================================================

#[test]
fn test_to_narrow_leaves_the_source_intact() {
    let mut shape = Shape!(Square { side: 2.0 });
    let area: Area = shape.to_narrow();

    shape.scale(10.0);
    assert_eq!(shape.area(), 400.0);
    assert_eq!(area.area(), 4.0);
}

#[test]
fn test_try_to_narrow_of_a_shared_reference_aliases() {
    interface! { Measured { fn area(&self) -> f64; fn perimeter(&self) -> f64; } }

    let square = Square { side: 2.0 };
    let measured = Measured!(&square);
    let area: Area = measured.try_to_narrow().unwrap();

    assert!(area.is_reference());
    assert!(std::ptr::eq(unsafe { area.target_ref::<Square>() }.unwrap(), &square));
}

#[test]
fn test_try_to_narrow_of_an_exclusive_reference_fails() {
    let mut square = Square { side: 2.0 };
    let shape = Shape!(&mut square);

    let err = shape.try_to_narrow::<Area>().unwrap_err();
    assert_eq!(err, Error::NotCloneable { interface: "Shape", type_name: "&mut _" });

    // Moving is still fine.
    let mut figure: Figure = shape.into_narrow();
    figure.scale(2.0);
    drop(figure);
    assert_eq!(square.side, 4.0);
}
