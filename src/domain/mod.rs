pub mod audiobook;
pub mod library;
