//! Three islands sharing one cart through the store stack
//!
//! Run with `RUST_LOG=islet=debug` to see allocation and policy diagnostics.

use islet::{
    observer_fn, use_store_with, AllocOptions, ErrorHandling, RemoveOptions, Store, StoreStack,
    UseStoreOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default)]
struct Cart {
    items: Vec<String>,
}

fn header_island() -> islet::Result<()> {
    use_store_with(
        Cart::default(),
        UseStoreOptions::new()
            .pointer("cart")
            .on_change(|cart: Cart| println!("   [header] {} item(s)", cart.items.len())),
    )?;
    Ok(())
}

fn sidebar_island() -> islet::Result<()> {
    let listing = observer_fn(|store: &Store<Cart>| {
        store.read(|cart| println!("   [sidebar] {}", cart.items.join(", ")));
    });

    use_store_with(
        Cart {
            items: vec!["ignored default".to_string()],
        },
        UseStoreOptions::new()
            .pointer("cart")
            .observer(listing)
            .error_handling(ErrorHandling::verbose()),
    )?;
    Ok(())
}

fn checkout_island() -> islet::Result<()> {
    let stack = StoreStack::current();
    let cart = stack
        .get::<Cart>("cart")
        .expect("header island allocates the cart");

    println!("   [checkout] adding tea");
    cart.modify(|cart| cart.items.push("tea".to_string()))?;

    println!("   [checkout] adding scones");
    cart.update(|mut cart| {
        cart.items.push("scones".to_string());
        cart
    })?;
    Ok(())
}

fn main() -> islet::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Islands Example: Shared Cart ===\n");

    println!("1. Islands hydrate in any order");
    header_island()?;
    sidebar_island()?;

    println!("\n2. Checkout mutates the cart");
    checkout_island()?;

    let stack = StoreStack::current();
    println!("\n3. Registry holds {} store(s): {:?}", stack.len(), stack);

    println!("\n4. Collisions are refused unless overridden");
    let refused = stack.add_store_at_pointer(
        Store::new(Cart::default()),
        "cart",
        AllocOptions::default().with_verbose(true),
    );
    println!("   refused: {}", refused.is_err());

    println!("\n5. Removing the cart twice");
    stack.remove_store("cart", RemoveOptions::default())?;
    if let Err(err) = stack.remove_store("cart", RemoveOptions::verbose()) {
        println!("   second removal failed: {err}");
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
