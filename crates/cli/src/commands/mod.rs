pub mod ask;
pub mod catalog;
pub mod doctor;
pub mod onboard;
