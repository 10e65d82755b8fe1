pub mod booking;
pub mod hair_style;
pub mod invoice;
pub mod page;
pub mod report;
pub mod service;
pub mod status;
pub mod user;

pub use booking::{Booking, BookingChanges, BookingDetail, BookingQuery, NewBooking, StatusChange};
pub use hair_style::{HairStyle, HairStyleChanges, HairStyleQuery, NewHairStyle};
pub use invoice::{Invoice, InvoiceDetail, InvoiceQuery, NewInvoice};
pub use page::{Page, PageRequest, SortDirection};
pub use report::{MonthlyRevenue, ReportFilter, RevenueInvoice, ServiceRevenue};
pub use service::{NewService, Service, ServiceChanges, ServiceDetail, ServiceQuery, ServiceStep, StepInput};
pub use status::Status;
pub use user::{NewUser, Role, User, UserChanges, UserQuery};
