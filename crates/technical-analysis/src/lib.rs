pub mod indicators;
pub mod analyzer;
pub mod forecast;


pub use indicators::*;
pub use analyzer::*;
pub use forecast::*;
