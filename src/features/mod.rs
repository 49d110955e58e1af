pub mod doctors;
pub mod facilities;
pub mod health;
pub mod locations;
