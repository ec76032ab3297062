pub mod layout;
pub mod operational;
pub mod plan;
pub mod reconcile;
pub mod reservation;
pub mod store;
