//! End-to-end tests: syntax trees built with `lark_ir::build`, run on a
//! real thread with buffered output.

pub(crate) mod harness;
