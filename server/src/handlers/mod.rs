pub mod page;
pub mod tests;
