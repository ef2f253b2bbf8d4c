pub mod cache;
pub mod catalog;
pub mod community;
pub mod generate;
pub mod jobs;
pub mod moderate;
pub mod payment;
pub mod storage;
pub mod users;
