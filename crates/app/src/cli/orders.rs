use clap::{Args, Subcommand};
use storefront::orders::OrderId;
use storefront_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List past orders
    List,

    /// Show one order
    Show(ShowArgs),
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Order id
    id: u32,
}

pub(crate) async fn run(ctx: &AppContext, command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::List => {
            let orders = ctx
                .orders
                .fetch_orders()
                .await
                .map_err(|error| format!("failed to list orders: {error}"))?;

            if orders.is_empty() {
                println!("no orders found");
                return Ok(());
            }

            for order in orders {
                println!("order_id: {}", order.id);
                println!("order_number: {}", order.custom_order_number);
                println!("created_on: {}", order.created_on);
                println!("total: {}", order.order_total);
                println!("status: {} / {}", order.order_status, order.payment_status);
                println!();
            }
        }
        OrdersSubcommand::Show(args) => {
            let details = ctx
                .orders
                .fetch_order(OrderId::new(args.id))
                .await
                .map_err(|error| format!("failed to load order: {error}"))?;

            println!("order_id: {}", details.summary.id);
            println!("order_number: {}", details.summary.custom_order_number);
            println!("created_on: {}", details.summary.created_on);
            println!("payment_method: {}", details.payment_method);

            for line in &details.lines {
                println!(
                    "  {} x{} @ {} = {}",
                    line.product_name, line.quantity, line.unit_price, line.sub_total
                );
            }

            println!("subtotal: {}", details.order_subtotal);
            println!("total: {}", details.summary.order_total);
        }
    }

    Ok(())
}
