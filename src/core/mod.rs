// Core utilities shared by engine seams and gameplay code

pub mod math;
