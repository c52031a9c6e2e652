//! User identity shell consumed by the payments core.

mod users_model;
mod users_traits;

pub use users_model::{NewUser, Principal, User};
pub use users_traits::UserRepositoryTrait;
