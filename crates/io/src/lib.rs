// Read-only workbook access. There is deliberately no write module: the
// source file can never be written back through this crate.

pub mod xlsx;
