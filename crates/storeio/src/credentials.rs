//! Credential plumbing (spec §1 Non-goals: "authentication beyond
//! accepting a credential object").

pub use storeio_wire::Credentials;
