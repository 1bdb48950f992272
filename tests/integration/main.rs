//! Integration tests

mod transform_tests;
