pub mod contact;
pub mod weather;
