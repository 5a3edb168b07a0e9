//! Records have named fields.
#![allow(dead_code, unused_crate_dependencies)]

use record_macro::Record;

#[derive(Record)]
struct Book(i64, String);

fn main() {}
