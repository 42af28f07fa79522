mod client;
mod phone_number;
mod phones;
mod changes;

pub use client::Client;
pub use phone_number::PhoneNumber;
pub use phones::Phones;
pub use changes::{ClientChanges, ClientFilter};
