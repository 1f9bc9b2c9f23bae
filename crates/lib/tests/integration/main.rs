mod build_tests;
mod common;
mod local_tests;
