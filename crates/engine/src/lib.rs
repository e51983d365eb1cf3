pub mod cell;
pub mod grid;
pub mod layout;
pub mod query;
pub mod sort;
pub mod util;
