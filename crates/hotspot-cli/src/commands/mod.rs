pub mod design;
pub mod visualize;
