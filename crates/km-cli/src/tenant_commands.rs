use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum TenantCommands {
    /// Create a tenant and its first admin user
    Create {
        #[arg(long)]
        name: String,
        /// Defaults to the name, lowercased and hyphenated
        #[arg(long)]
        slug: Option<String>,
        #[arg(long, default_value = "starter")]
        tier: String,
        #[arg(long, default_value_t = 10)]
        max_users: u32,
        #[arg(long, default_value_t = 10)]
        max_storage_gb: u32,
        #[arg(long)]
        admin_email: String,
        #[arg(long)]
        admin_password: String,
        #[arg(long)]
        admin_first_name: Option<String>,
        #[arg(long)]
        admin_last_name: Option<String>,
    },
}
