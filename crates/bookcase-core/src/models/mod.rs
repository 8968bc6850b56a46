pub mod book;
pub mod record;
pub mod shelf;

pub use book::*;
pub use record::*;
pub use shelf::*;
