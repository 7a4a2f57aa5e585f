pub mod ratings;
pub mod registrations;
pub mod stores;
pub mod users;

pub use ratings::RatingRepository;
pub use registrations::RegistrationRepository;
pub use stores::{NewStore, StoreChanges, StoreFilter, StoreRepository};
pub use users::{NewUser, UserChanges, UserFilter, UserRepository};
