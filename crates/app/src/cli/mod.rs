use std::sync::Arc;

use clap::{Parser, Subcommand};
use storefront_app::{
    config::StorefrontConfig,
    context::AppContext,
    notifications::{NotificationQueue, Notifier, TracingNotifier},
    stores::{AssumeYes, Confirm},
};

mod addresses;
mod cart;
mod checkout;
mod orders;
mod output;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: StorefrontConfig,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    /// Log notifications instead of printing them
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Cart(cart::CartCommand),
    Addresses(addresses::AddressesCommand),
    Orders(orders::OrdersCommand),
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    /// Parse arguments after loading `.env`, if present.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let notifications = Arc::new(NotificationQueue::new());
        let notifier: Arc<dyn Notifier> = if self.quiet {
            Arc::new(TracingNotifier)
        } else {
            notifications.clone()
        };
        let confirm: Arc<dyn Confirm> = if self.yes {
            Arc::new(AssumeYes)
        } else {
            Arc::new(output::StdinConfirm)
        };

        let ctx = AppContext::from_config(&self.config.api, notifier, confirm)
            .map_err(|error| format!("failed to start: {error}"))?;

        let result = match self.command {
            Commands::Cart(command) => cart::run(&ctx, &self.config.display, command).await,
            Commands::Addresses(command) => addresses::run(&ctx, command).await,
            Commands::Orders(command) => orders::run(&ctx, command).await,
            Commands::Checkout(args) => checkout::run(&ctx, args).await,
        };

        output::print_notifications(&notifications);

        result
    }
}
