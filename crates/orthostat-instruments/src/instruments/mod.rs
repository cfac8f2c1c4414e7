pub mod compass31;
