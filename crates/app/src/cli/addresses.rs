use clap::{Args, Subcommand};
use storefront::addresses::{Address, AddressForm, AddressId};
use storefront_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct AddressesCommand {
    #[command(subcommand)]
    command: AddressesSubcommand,
}

#[derive(Debug, Subcommand)]
enum AddressesSubcommand {
    /// List saved addresses
    List,

    /// Save a new address
    Add(AddArgs),

    /// Delete a saved address
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Short name shown on the address card
    #[arg(long, default_value = "")]
    label: String,

    #[arg(long)]
    phone: String,

    /// Street line
    #[arg(long)]
    address1: String,

    /// Building, floor and apartment line
    #[arg(long)]
    address2: String,

    #[arg(long, default_value = "")]
    building: String,

    #[arg(long, default_value = "")]
    apartment: String,

    #[arg(long, default_value = "")]
    floor: String,

    #[arg(long, default_value = "")]
    city: String,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Address id
    id: u32,
}

pub(crate) async fn run(ctx: &AppContext, command: AddressesCommand) -> Result<(), String> {
    match command.command {
        AddressesSubcommand::List => {
            ctx.addresses
                .fetch_addresses()
                .await
                .map_err(|error| format!("failed to list addresses: {error}"))?;

            let addresses = ctx.addresses.addresses();

            if addresses.is_empty() {
                println!("no saved addresses");
            }

            for address in &addresses {
                print_address(address);
            }
        }
        AddressesSubcommand::Add(args) => {
            let address = ctx
                .addresses
                .add_address(AddressForm {
                    label: args.label,
                    phone_number: args.phone,
                    address1: args.address1,
                    address2: args.address2,
                    building_no: args.building,
                    apartment_no: args.apartment,
                    floor_no: args.floor,
                    city: args.city,
                })
                .await
                .map_err(|error| format!("failed to add address: {error}"))?;

            print_address(&address);
        }
        AddressesSubcommand::Delete(args) => {
            ctx.addresses
                .fetch_addresses()
                .await
                .map_err(|error| format!("failed to list addresses: {error}"))?;

            let deleted = ctx
                .addresses
                .delete_address(AddressId::new(args.id))
                .await
                .map_err(|error| format!("failed to delete address: {error}"))?;

            if !deleted {
                println!("address {} kept", args.id);
            }
        }
    }

    Ok(())
}

fn print_address(address: &Address) {
    println!("address_id: {}", address.id);
    if !address.label.is_empty() {
        println!("label: {}", address.label);
    }
    println!("phone: {}", address.phone_number);
    println!("address: {}, {}", address.address1, address.address2);
    println!("city: {}", address.city);
    println!();
}
