pub mod artifact;
pub mod forecast;
