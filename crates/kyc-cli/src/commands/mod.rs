// crates/kyc-cli/src/commands/mod.rs
//
// Command module declarations for the KYC CLI.

pub mod health;
pub mod info;
pub mod verify;
