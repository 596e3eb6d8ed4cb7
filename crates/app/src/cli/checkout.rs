use clap::Args;
use storefront::{
    addresses::AddressId,
    checkout::{NewAddress, PaymentMethod, PersonalInfo},
};
use storefront_app::{
    checkout::{ConfirmOutcome, GoToCheckout, SignInOutcome},
    context::AppContext,
    session::Credentials,
};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    #[arg(long)]
    full_name: String,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    email: String,

    /// Password to sign in with; checks out as a guest when omitted
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Saved address id to ship to
    #[arg(long, conflicts_with = "street")]
    address: Option<u32>,

    #[arg(long, default_value = "")]
    street: String,

    #[arg(long, default_value = "")]
    building: String,

    #[arg(long, default_value = "")]
    apartment: String,

    #[arg(long, default_value = "")]
    floor: String,

    #[arg(long, default_value = "")]
    notes: String,

    #[arg(long, default_value = "")]
    city: String,
}

/// Walk every checkout step, paying cash on delivery.
pub(crate) async fn run(ctx: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    ctx.cart
        .fetch_cart_items()
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?;

    let started = ctx
        .checkout
        .go_to_checkout()
        .map_err(|error| format!("cannot start checkout: {error}"))?;

    if started == GoToCheckout::SignInRequired {
        match args.password.as_deref() {
            Some(password) => {
                let outcome = ctx
                    .checkout
                    .sign_in(Credentials::new(args.email.trim(), password))
                    .await
                    .map_err(|error| format!("sign-in failed: {error}"))?;

                if let SignInOutcome::CheckoutBlocked(error) = outcome {
                    return Err(format!("signed in, but cannot start checkout: {error}"));
                }
            }
            None => ctx
                .checkout
                .abandon_sign_in()
                .map_err(|error| format!("cannot continue as guest: {error}"))?,
        }
    } else if ctx.session.is_authenticated() {
        ctx.addresses
            .fetch_addresses()
            .await
            .map_err(|error| format!("failed to load addresses: {error}"))?;
    }

    ctx.checkout
        .next()
        .map_err(|error| format!("cannot continue checkout: {error}"))?;

    match args.address {
        Some(id) => ctx.checkout.select_address(AddressId::new(id)),
        None => ctx.checkout.use_new_address(),
    }

    let info = PersonalInfo {
        full_name: args.full_name,
        phone_number: args.phone,
        email: args.email,
        new_address: NewAddress {
            street: args.street,
            building_no: args.building,
            apartment_no: args.apartment,
            floor_no: args.floor,
            notes: args.notes,
            city: args.city,
        },
    };

    ctx.checkout
        .submit_personal_info(&info, None)
        .await
        .map_err(|error| format!("failed to submit personal info: {error}"))?;

    ctx.checkout
        .select_payment_method(PaymentMethod::CashOnDelivery)
        .await
        .map_err(|error| format!("failed to select payment method: {error}"))?;

    match ctx
        .checkout
        .confirm_order()
        .await
        .map_err(|error| format!("failed to confirm order: {error}"))?
    {
        ConfirmOutcome::OrderPlaced(placed) => match placed.order_id {
            Some(order_id) => println!("order placed: {order_id}"),
            None => println!("order placed"),
        },
        ConfirmOutcome::NotCompleted { redirect } => {
            return Err(format!(
                "order was not completed (next step: {})",
                redirect.as_deref().unwrap_or("unknown")
            ));
        }
    }

    Ok(())
}
