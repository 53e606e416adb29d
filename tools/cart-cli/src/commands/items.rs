//! Cart mutation commands.

use std::io::BufRead;

use anyhow::{Context as _, Result};
use cart_kv::KeyValueStore;
use cart_store::{CartAction, CartError, CartStore, ItemId, NewItem, PriceInput};

use super::{show, AddArgs, DispatchArgs, ItemArgs};
use crate::context::Context;

/// Run the add command.
pub fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let item = NewItem {
        id: ItemId::new(args.id),
        title: args.title,
        image: args.image,
        price: PriceInput::Text(args.price),
    };
    apply(ctx, CartAction::AddItem(item))
}

/// Run the remove command.
pub fn remove(args: ItemArgs, ctx: &Context) -> Result<()> {
    apply(ctx, CartAction::RemoveItem(ItemId::new(args.id)))
}

/// Run the delete command.
pub fn delete(args: ItemArgs, ctx: &Context) -> Result<()> {
    apply(ctx, CartAction::DeleteItem(ItemId::new(args.id)))
}

/// Run the dispatch command.
pub fn dispatch(args: DispatchArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.open_cart()?;

    match args.action {
        Some(raw) => {
            let action = CartAction::from_json(&raw).context("Invalid action")?;
            run_action(&mut cart, action, ctx)?;
        }
        None => {
            let stdin = std::io::stdin();
            for (n, line) in stdin.lock().lines().enumerate() {
                let line = line.context("Failed to read stdin")?;
                if line.trim().is_empty() {
                    continue;
                }
                let action = CartAction::from_json(&line)
                    .with_context(|| format!("Invalid action on line {}", n + 1))?;
                run_action(&mut cart, action, ctx)?;
            }
        }
    }

    show::render(&cart, &ctx.output);
    Ok(())
}

fn apply(ctx: &Context, action: CartAction) -> Result<()> {
    let mut cart = ctx.open_cart()?;
    run_action(&mut cart, action, ctx)?;
    show::render(&cart, &ctx.output);
    Ok(())
}

/// Apply one action; an unknown id is reported but not fatal.
fn run_action<S: KeyValueStore>(
    cart: &mut CartStore<S>,
    action: CartAction,
    ctx: &Context,
) -> Result<()> {
    let kind = action.kind();
    let id = action.item_id().clone();
    ctx.output.debug(&format!("Dispatching {} for {}", kind, id));

    match cart.dispatch(action) {
        Ok(()) => {
            ctx.output.success(&describe(kind, &id));
            Ok(())
        }
        Err(CartError::ItemNotFound(id)) => {
            ctx.output.warn(&format!("Item {} is not in the cart; nothing changed.", id));
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("{} rejected", kind)),
    }
}

fn describe(kind: &str, id: &ItemId) -> String {
    match kind {
        "cart/addItem" => format!("Added one {}", id),
        "cart/removeItem" => format!("Removed one {}", id),
        _ => format!("Deleted {}", id),
    }
}
