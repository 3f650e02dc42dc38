use crate::tenant_commands::TenantCommands;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start or restore a session; prints the login redirect when one is needed
    Login,

    /// Complete a login with the URL the identity provider redirected to
    Callback {
        /// Full callback URL including `code` and `state`
        url: String,
    },

    /// Sign in with email and password (local identity mode)
    PasswordLogin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Show the current session and tenant
    Status,

    /// Resolve the tenant for the current session
    Resolve {
        /// Extra candidate, tried before all others (repeatable)
        #[arg(long = "candidate")]
        candidates: Vec<String>,
    },

    /// Point the session at another tenant (slug or UUID)
    SwitchTenant { value: String },

    /// Check whether the signed-in user has a role
    HasRole { role: String },

    /// Sign out and clear the stored session
    Logout,

    /// Keep the session alive and print every change until interrupted
    Watch,

    /// Tenant administration
    Tenant {
        #[command(subcommand)]
        action: TenantCommands,
    },
}
