//! Cart display.

use anyhow::Result;
use cart_kv::KeyValueStore;
use cart_store::{CartState, CartStore};
use serde::Serialize;

use crate::context::Context;
use crate::output::{format_price, format_timestamp, Output};

/// JSON view of a cart.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView<'a> {
    #[serde(flatten)]
    state: &'a CartState,
    updated_at: Option<i64>,
    saved: bool,
}

/// Run the show command.
pub fn run(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    render(&cart, &ctx.output);
    Ok(())
}

/// Print the cart snapshot.
pub fn render<S: KeyValueStore>(cart: &CartStore<S>, output: &Output) {
    if output.is_json() {
        output.json(&CartView {
            state: cart.state(),
            updated_at: cart.updated_at(),
            saved: !cart.is_dirty(),
        });
        return;
    }

    output.header("Cart");

    if cart.is_empty() {
        output.info("Your cart is empty.");
    } else {
        let widths = [12, 28, 5, 10, 10];
        output.table_row(&["ID", "TITLE", "QTY", "PRICE", "LINE TOTAL"], &widths);
        for line in cart.items() {
            let quantity = line.quantity.to_string();
            let price = format_price(line.unit_price);
            let total = format_price(line.line_total);
            output.table_row(
                &[line.id.as_str(), &line.title, &quantity, &price, &total],
                &widths,
            );
        }
    }

    println!();
    output.kv("Total quantity", &cart.total_quantity().to_string());
    output.kv("Total amount", &format_price(cart.total_amount()));
    output.kv("Last saved", &format_timestamp(cart.updated_at()));

    if cart.is_dirty() {
        output.warn("Latest changes are not saved: storage write failed.");
    }
}
