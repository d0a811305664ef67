pub mod errors;
pub mod models;
pub mod tools;
pub mod value;
