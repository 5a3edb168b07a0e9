//! Floats have no kind.
#![allow(dead_code, unused_crate_dependencies)]

use record_macro::Record;

#[derive(Record)]
struct Book {
    id: i64,
    price: f64,
}

fn main() {}
