pub mod matrix;
pub mod svd;
pub mod vector;
