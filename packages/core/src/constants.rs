use std::env;
use std::path::PathBuf;

/// Get the path to the Kiln directory (~/.kiln)
pub fn kiln_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".kiln")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".kiln")
    }
}

/// Get the path to the default database file (~/.kiln/kiln.db)
pub fn database_file() -> PathBuf {
    kiln_dir().join("kiln.db")
}
