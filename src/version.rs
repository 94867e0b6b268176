// Centralized version information

// Display version - what the tool prints in its banner
pub const DISPLAY_VERSION: &str = "v0.2-rust";

// Cargo package version from Cargo.toml
pub const CARGO_VERSION: &str = env!("CARGO_PKG_VERSION");

// Full version string including Cargo version
pub fn full_version() -> String {
    format!("{} ({})", DISPLAY_VERSION, CARGO_VERSION)
}
