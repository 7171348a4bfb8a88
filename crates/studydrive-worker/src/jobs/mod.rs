//! Job handler implementations.

pub mod retention;
