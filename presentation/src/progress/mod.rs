//! Progress reporting observers

pub mod reporter;
