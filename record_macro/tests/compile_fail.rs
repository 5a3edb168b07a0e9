//! Compile-fail tests for `#[derive(Record)]`.

// Silence unused-crate-dependencies lint for compile-test crate
use proc_macro2 as _;
use quote as _;
use record_macro as _;
use syn as _;

#[cfg(test)]
mod tests {
    #[test]
    fn unsupported_records_are_rejected() {
        let cases = trybuild::TestCases::new();
        cases.compile_fail("tests/ui/*.rs");
    }
}
