pub mod payoff;
pub mod search;
pub mod summary;
pub mod target;
pub mod universe;
