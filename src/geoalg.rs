pub mod f32_math;
