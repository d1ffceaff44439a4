pub mod coords;
pub mod probe;
