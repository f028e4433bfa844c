pub mod shape;
pub mod tensor;
pub mod matrix;
