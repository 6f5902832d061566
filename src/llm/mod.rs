pub mod interface;
pub mod openai_compatible;
pub mod types;

pub use interface::*;
pub use openai_compatible::*;
pub use types::*;
