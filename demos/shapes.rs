//! Runtime Polymorphism Without Traits
//!
//! This example wraps unrelated types into one handle type, calls them
//! through a dispatch table, narrows the handle, and recovers the concrete
//! types again.
//!
//! Run with `cargo run --example shapes`.

use tola_dyn::prelude::*;

interface! {
    /// Anything with an area that can be resized.
    pub Shape {
        fn area(&self) -> f64;
        fn name(&self) -> &str;
        fn scale(&mut self, factor: f64);
    }

    /// Read-only view.
    pub Area {
        fn area(&self) -> f64;
        fn name(&self) -> &str;
    }
}

// --- Concrete Types (no shared trait) ---

#[derive(Clone, Debug)]
struct Square {
    side: f64,
}

impl Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }

    fn name(&self) -> &str {
        "square"
    }

    fn scale(&mut self, factor: f64) {
        self.side *= factor;
    }
}

#[derive(Clone, Debug)]
struct Circle {
    radius: f64,
    label: String,
}

impl Circle {
    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn scale(&mut self, factor: f64) {
        self.radius *= factor;
    }
}

fn report(title: &str, shapes: &[Area]) {
    println!("{}:", title);
    for shape in shapes {
        println!("  {:<8} {:>8.3}  ({})", shape.name(), shape.area(), if shape.is_reference() { "ref" } else { "value" });
    }
}

fn main() {
    // =========================================================================
    // 1. Value Mode
    // =========================================================================

    let mut shapes = vec![
        Shape!(Square { side: 4.0 }),
        Shape!(Circle { radius: 2.0, label: "circle".into() }),
    ];
    for shape in &mut shapes {
        shape.scale(0.5);
    }

    // =========================================================================
    // 2. Reference Mode
    // =========================================================================

    let big = Square { side: 10.0 };
    let by_ref = Area!(&big);
    assert_eq!(by_ref, Area!(&big));

    // =========================================================================
    // 3. Narrowing
    // =========================================================================

    let mut areas: Vec<Area> = shapes.iter().map(|s| s.to_narrow()).collect();
    areas.push(by_ref);
    report("scaled by 0.5", &areas);

    // =========================================================================
    // 4. Downcasting
    // =========================================================================

    for shape in &shapes {
        match (shape.target::<Square>(), shape.target::<Circle>()) {
            (Some(square), _) => println!("square with side {}", square.side),
            (_, Some(circle)) => println!("circle with radius {}", circle.radius),
            _ => unreachable!(),
        }
    }

    let empty = Shape::default();
    println!("{:?} / {:?}", empty, shapes[0]);
}
