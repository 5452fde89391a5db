//! Advisory dependency/priority validation for the creation form

pub mod dependencies;
pub mod form;
