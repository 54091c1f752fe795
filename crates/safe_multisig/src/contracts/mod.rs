pub mod safe;
