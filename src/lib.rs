//! Workspace root package. It carries no code; it exists so the pre-commit
//! hooks configured in `Cargo.toml` are installed for every contributor.
