pub mod contact_repo;
pub use contact_repo::ContactRepository;
