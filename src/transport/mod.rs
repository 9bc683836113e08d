/// Local filesystem helpers used by staging, materialization, and enumeration.
pub mod fs;
