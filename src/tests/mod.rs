// Test modules for chatsync
// Each module contains tests for the corresponding source file

mod config_tests;
mod helpers;
