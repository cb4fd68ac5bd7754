pub mod finding;
pub mod outcome;
pub mod report;

pub use finding::*;
pub use outcome::*;
pub use report::*;
