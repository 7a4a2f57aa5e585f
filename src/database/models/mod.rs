pub mod rating;
pub mod registration;
pub mod role;
pub mod store;
pub mod user;

pub use rating::{Rating, RatingWithUser};
pub use registration::{Registration, RegistrationWithStore, RegistrationWithUser};
pub use role::Role;
pub use store::{Store, StoreSummary};
pub use user::User;
