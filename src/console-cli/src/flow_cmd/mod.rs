//! Authentication flow commands.
//!
//! ```bash
//! # Check a stored sequence
//! idconsole flow check -f sequence.json
//!
//! # Replay an editing session and commit the result
//! idconsole flow apply -f sequence.json --catalog catalog.json --script ops.yaml --commit
//! ```

mod args;
mod commands;
mod report;

pub use args::{FlowApplyArgs, FlowCheckArgs, FlowCli, FlowCommands};
pub use report::{CommandReport, FlowApplyReport, FlowCheckReport, apply_script, check_sequence};

use anyhow::Result;
use console_common::ConsoleConfig;

impl FlowCli {
    pub async fn run(self, config: &ConsoleConfig) -> Result<()> {
        match self.command {
            FlowCommands::Check(args) => commands::run_check(args, config).await,
            FlowCommands::Apply(args) => commands::run_apply(args, config).await,
        }
    }
}
