//! snowdeploy - Deploy only the Snowpark projects that changed in a monorepo.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── deploy        # The deployment run
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── config        # .snowdeploy.toml management
//!     ├── changes       # Changed-file list parsing
//!     ├── discovery/    # Project discovery strategies
//!     │   ├── walk      # Nearest ancestor with snowflake.yml
//!     │   ├── prefix    # steps/<name>/ grouping
//!     │   └── manifest  # Explicit project list
//!     ├── project       # snowflake.yml marker file
//!     ├── target        # <client>_<env> tokens
//!     ├── secrets/      # Secret sources
//!     │   ├── aws       # AWS Secrets Manager
//!     │   └── file      # Local JSON file
//!     ├── keys          # Private key decryption to a temp file
//!     ├── environment   # Connection settings
//!     └── dispatch      # snow build/deploy per project
//! ```
//!
//! # Features
//!
//! - Three discovery strategies behind one configuration switch
//! - Key-pair credentials resolved per target, key file removed after the run
//! - Connection passed per command, never through the process environment
//! - Per-project results with a failing exit status when any deploy fails

pub mod cli;
pub mod core;
pub mod error;
