pub mod agent;
pub mod application;
pub mod auth;
pub mod history;
pub mod lead;
pub mod reference;
pub mod task;
