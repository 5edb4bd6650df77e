pub mod disk;
pub mod post;
pub mod ring;
pub mod sequence;
pub mod stars;
