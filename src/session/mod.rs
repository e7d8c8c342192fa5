//! Test session module

mod engine;
mod handle;
mod normalize;
mod record;
mod report;
mod result;
mod snapshot;
mod state;


pub use engine::*;
pub use handle::*;
pub use normalize::*;
pub use record::*;
pub use report::*;
pub use result::*;
pub use snapshot::*;
pub use state::*;
