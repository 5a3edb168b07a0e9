/// Translation to parameterised SQL.
mod sql;
pub use sql::*;
