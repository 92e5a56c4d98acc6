//! Utility functions

pub mod id_generator;
