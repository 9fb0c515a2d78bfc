//! Core types shared by the loaders and renderer: math re-exports and colours.

pub use glam::{Vec3, vec3};

pub mod color;

pub use color::Color;
