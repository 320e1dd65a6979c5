mod spotify;
mod youtube;

pub use spotify::*;
pub use youtube::*;
