pub mod csv;
pub mod notes;

pub use notes::{build_vault, build_vault_at, ExportSummary, VaultPaths};
