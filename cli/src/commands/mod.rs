pub mod check;
pub mod count;
