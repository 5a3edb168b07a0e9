//! Every record has an identity field.
#![allow(dead_code, unused_crate_dependencies)]

use record_macro::Record;

#[derive(Record)]
struct Book {
    title: String,
}

fn main() {}
