//! Core data structures — geometry, buffers, scrolling, and the inventory.
//!
//! Nothing in this module draws anything; every type here can be exercised
//! headless, which is where the bulk of the test coverage lives.

pub mod backend;
pub mod geometry;
pub mod grid;
pub mod inventory;
pub mod viewport;
