//! Side-scrolling arcade games for the terminal: a platformer with two rule
//! variants and a horizontally scrolling shooter.
//!
//! The library holds all game state and logic and performs no terminal I/O.
//! The binary in `main.rs` polls the keyboard, drives the frame loop and
//! renders.

pub mod clock;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod geometry;
pub mod level;
pub mod scores;
pub mod shooter;
