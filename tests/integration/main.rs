//! Integration test suite.

mod mock_backend;
mod slip_flow;
