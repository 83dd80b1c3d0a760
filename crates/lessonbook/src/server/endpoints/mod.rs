pub mod bookings;
pub mod profiles;
pub mod public;
pub mod slots;
pub mod status;
