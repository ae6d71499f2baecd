pub mod estimates;
pub mod orders;
pub mod translations;
