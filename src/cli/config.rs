use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "designer-step-editor",
    version,
    about = "Edit a Service Designer test step's inputs as one JSON document"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the browser sidecar script
    #[arg(long, global = true)]
    pub server_script: Option<String>,

    /// Path to config file (default: step-editor.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the test step and print its inputs as one JSON object
    Export {
        /// Test-step page URL
        #[arg(long)]
        url: String,

        /// Write the JSON document to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write a JSON document's values back into the test step's inputs
    Sync {
        /// Test-step page URL
        #[arg(long)]
        url: String,

        /// Path to the JSON document ("-" reads stdin)
        #[arg(long, default_value = "-")]
        json: String,
    },

    /// Click the page's Run Test button
    RunTest {
        /// Test-step page URL
        #[arg(long)]
        url: String,
    },

    /// Keep the tab title in sync with the step's method name
    Watch {
        /// Test-step page URL
        #[arg(long)]
        url: String,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Stop after this many polls (0 = run until interrupted)
        #[arg(long, default_value_t = 0)]
        max_polls: u64,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `step-editor.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_server_script")]
    pub server_script: String,

    /// How long to let the page settle after navigation, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server_script: default_server_script(),
            settle_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    /// JSONL trace file; omit to disable tracing.
    pub path: Option<String>,
}

// Serde default helpers
fn default_server_script() -> String {
    "node/designer_server.js".to_string()
}
fn default_settle_ms() -> u64 {
    1000
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("step-editor.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
