pub mod bookings;
pub mod catalog;
pub mod invoices;
pub mod pricing;
pub mod receipt;
pub mod reports;
pub mod workflow;
