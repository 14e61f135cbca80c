//! Helpers shared by the derive modules.

pub mod syn_types;
