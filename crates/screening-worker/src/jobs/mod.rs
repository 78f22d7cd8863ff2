//! Task handler implementations.

pub mod screening;

pub use screening::ScreeningJobHandler;
