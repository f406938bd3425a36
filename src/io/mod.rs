//! Input handling for the batch tool: the line-oriented testcase format.

pub mod testcase_reader;

pub use testcase_reader::{open_testcase_file, read_all, TestcaseReader};
