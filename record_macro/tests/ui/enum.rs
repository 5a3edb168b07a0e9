//! Records are structs.
#![allow(dead_code, unused_crate_dependencies)]

use record_macro::Record;

#[derive(Record)]
enum Book {
    Hardcover,
    Paperback,
}

fn main() {}
