use std::io;

use clap::{Args, Subcommand};
use storefront::{
    attributes::{AttributeSelection, unique_selections},
    cart::ProductId,
    pricing::currency,
    receipt::write_cart,
};
use storefront_app::{config::DisplayConfig, context::AppContext};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart with its totals
    Show,

    /// Add a product to the cart
    Add(AddArgs),

    /// Set the quantity of a cart line
    Set(SetArgs),

    /// Remove a product from the cart
    Remove(ProductArgs),

    /// Apply a discount coupon
    Coupon(CouponArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id
    #[arg(long)]
    product: u32,

    /// Quantity to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Attribute choice as `ATTRIBUTE_ID=VALUE_ID`; repeatable
    #[arg(long = "attribute", value_parser = parse_selection)]
    attributes: Vec<AttributeSelection>,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Product id
    #[arg(long)]
    product: u32,

    /// New quantity
    #[arg(long)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct ProductArgs {
    /// Product id
    #[arg(long)]
    product: u32,
}

#[derive(Debug, Args)]
struct CouponArgs {
    /// Coupon code
    code: String,
}

pub(crate) async fn run(
    ctx: &AppContext,
    display: &DisplayConfig,
    command: CartCommand,
) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show => {
            ctx.cart
                .fetch_cart_items()
                .await
                .map_err(|error| format!("failed to load cart: {error}"))?;
        }
        CartSubcommand::Add(args) => {
            let attributes = unique_selections(args.attributes)
                .map_err(|error| format!("invalid attributes: {error}"))?;

            ctx.cart
                .add_to_cart(ProductId::new(args.product), args.quantity, attributes)
                .await
                .map_err(|error| format!("failed to add product: {error}"))?;
        }
        CartSubcommand::Set(args) => {
            // The store only updates lines it already knows about.
            ctx.cart
                .fetch_cart_items()
                .await
                .map_err(|error| format!("failed to load cart: {error}"))?;

            ctx.cart
                .update_quantity(ProductId::new(args.product), args.quantity)
                .await
                .map_err(|error| format!("failed to update quantity: {error}"))?;
        }
        CartSubcommand::Remove(args) => {
            ctx.cart
                .fetch_cart_items()
                .await
                .map_err(|error| format!("failed to load cart: {error}"))?;

            ctx.cart
                .remove_item(ProductId::new(args.product))
                .await
                .map_err(|error| format!("failed to remove product: {error}"))?;
        }
        CartSubcommand::Coupon(args) => {
            ctx.cart
                .apply_coupon(&args.code)
                .await
                .map_err(|error| format!("failed to apply coupon: {error}"))?;
        }
    }

    let currency = currency(&display.currency).map_err(|error| error.to_string())?;

    write_cart(&mut io::stdout().lock(), &ctx.cart.cart(), currency)
        .map_err(|error| format!("failed to print cart: {error}"))
}

fn parse_selection(raw: &str) -> Result<AttributeSelection, String> {
    let (attribute, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ATTRIBUTE_ID=VALUE_ID, got `{raw}`"))?;

    let attribute_id = attribute
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid attribute id `{attribute}`: {error}"))?;
    let value_id = value
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid value id `{value}`: {error}"))?;

    Ok(AttributeSelection {
        attribute_id: attribute_id.into(),
        value_id: value_id.into(),
    })
}
