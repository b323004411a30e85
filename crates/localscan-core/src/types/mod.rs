mod outcome;
mod scan;

pub use outcome::*;
pub use scan::*;
