pub mod errors;
pub mod evaluate;
pub mod rules;

// Re-export main components
pub use errors::*;
pub use evaluate::*;
pub use rules::*;
