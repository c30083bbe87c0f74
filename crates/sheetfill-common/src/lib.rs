pub mod coord;
pub mod error;
pub mod placeholder;
pub mod value;

pub use coord::*;
pub use error::*;
pub use placeholder::*;
pub use value::*;
