pub mod catalog;
pub mod classification;
pub mod language;
pub mod message;
pub mod outcome;

pub use catalog::*;
pub use classification::*;
pub use language::*;
pub use message::*;
pub use outcome::*;
