//! idconsole - the identity console core from the command line.
//!
//! - `cli/` - argument parsing and dispatch
//! - `flow_cmd` - check and edit step based authentication flows
//! - `oidc_cmd` - validate inbound OIDC settings
//! - `login_cmd` - inspect sign-in settings and endpoints
//! - `styled_output` - icons and colors for terminal messages

pub mod cli;
pub mod flow_cmd;
pub mod helpers;
pub mod login_cmd;
pub mod oidc_cmd;
pub mod styled_output;
