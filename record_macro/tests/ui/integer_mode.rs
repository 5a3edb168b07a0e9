//! Integers only match exactly.
#![allow(dead_code, unused_crate_dependencies)]

use record_macro::Record;

#[derive(Record)]
struct Book {
    id: i64,
    #[record(mode = "contains")]
    year: i32,
}

fn main() {}
