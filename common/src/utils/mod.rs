pub mod func;
pub mod rot_matrix;
