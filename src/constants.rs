//! Common constants used throughout folio.

/// Extension of template files rewritten by the substitution pass.
pub const MARKER_EXTENSION: &str = "ejs";

/// Extension given to rewritten template files.
pub const TARGET_EXTENSION: &str = "jsx";

/// Supported configuration file names
pub const CONFIG_FILES: [&str; 3] = ["portfolio.json", "portfolio.yml", "portfolio.yaml"];

/// Ignore file name, read from the template root
pub const IGNORE_FILE: &str = ".portfolioignore";

/// Root application file, relative to the output tree.
pub const APP_FILE: &str = "src/App.jsx";

/// Bootstrap file, relative to the output tree.
pub const BOOTSTRAP_FILE: &str = "src/main.jsx";

/// Section components that receive the user data from the root application.
pub const SECTIONS: [&str; 8] =
    ["Hero", "About", "Navbar", "Projects", "Clients", "WorkExperience", "Contact", "Footer"];

/// Name of the user-data prop forwarded to the application.
pub const USER_DATA_PROP: &str = "userData";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Initial commit";
pub const DEFAULT_DESCRIPTION: &str = "This is my portfolio website";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TOKEN_ENV: &str = "GIT_ACCESS_TOKEN";
pub const REMOTE_NAME: &str = "origin";

/// Seconds to wait for a spawned server before giving up.
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;

/// Seconds allowed for build, deploy and git commands.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 600;

/// Log target for forwarded child process output.
pub const CHILD_LOG_TARGET: &str = "folio::child";
