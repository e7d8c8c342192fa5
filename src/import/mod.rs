//! Question bank import module

mod pipeline;
mod row;


pub use pipeline::*;
pub use row::*;
