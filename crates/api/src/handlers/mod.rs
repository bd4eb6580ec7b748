pub mod objects;
pub mod rules;
pub mod schemas;
