//! Integration tests for the stagectl CLI surface.
//!
//! Argument parsing and help output only - nothing here talks to AWS.

mod cli_tests;
