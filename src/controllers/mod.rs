pub mod audiobook;
pub mod health;
pub mod library;
pub mod pages;
