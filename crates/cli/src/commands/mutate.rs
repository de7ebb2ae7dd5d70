use clap::Args;
use rust_decimal::Decimal;
use sweetshop_core::{InventoryOp, ProductDraft, ProductId, ProductPatch};
use tokio_util::sync::CancellationToken;

use crate::commands::{interruptible, CommandResult, Payload, Session};

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub price: Decimal,
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: i64,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, help = "Image URL; not checked for reachability")]
    pub image: Option<String>,
}

impl From<AddArgs> for ProductDraft {
    fn from(args: AddArgs) -> Self {
        Self {
            name: args.name,
            category: args.category,
            price: args.price,
            quantity: args.quantity,
            description: args.description,
            image: args.image,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub price: Option<Decimal>,
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: Option<i64>,
    #[arg(long, help = "Pass an empty string to clear the description")]
    pub description: Option<String>,
    #[arg(long, help = "Pass an empty string to clear the image")]
    pub image: Option<String>,
}

impl EditArgs {
    fn into_op(self) -> InventoryOp {
        InventoryOp::Update {
            id: ProductId(self.id),
            patch: ProductPatch {
                name: self.name,
                category: self.category,
                price: self.price,
                quantity: self.quantity,
                description: self.description,
                image: self.image,
            },
        }
    }
}

pub fn purchase(id: String) -> CommandResult {
    run("purchase", InventoryOp::Purchase { id: ProductId(id) })
}

pub fn restock(id: String, amount: i64) -> CommandResult {
    run("restock", InventoryOp::Restock { id: ProductId(id), amount })
}

pub fn add(args: AddArgs) -> CommandResult {
    run("add", InventoryOp::Create { draft: args.into() })
}

pub fn edit(args: EditArgs) -> CommandResult {
    let op = args.into_op();
    if matches!(&op, InventoryOp::Update { patch, .. } if patch.is_empty()) {
        return CommandResult::failure(
            "edit",
            "invalid_input",
            "edit needs at least one field to change",
            5,
        );
    }
    run("edit", op)
}

pub fn delete(id: String) -> CommandResult {
    run("delete", InventoryOp::Delete { id: ProductId(id) })
}

/// Submits one operation against a freshly seeded catalog. Ctrl-C during the
/// simulated latency cancels the operation before it is applied.
fn run(command: &str, op: InventoryOp) -> CommandResult {
    let session = match Session::open(command) {
        Ok(session) => session,
        Err(result) => return result,
    };

    let cancel = CancellationToken::new();
    let outcome =
        session.block_on(interruptible(command, &cancel, session.store.submit(op, &cancel)));

    let notification = session.last_notification();
    match outcome {
        Ok(product) => CommandResult::success_with(
            command,
            notification.clone().unwrap_or_else(|| format!("{command} applied")),
            Payload { notification, products: Some(vec![product]), ..Payload::default() },
        ),
        Err(error) => CommandResult::failure_with(
            command,
            error.class(),
            error.to_string(),
            5,
            Payload { notification, ..Payload::default() },
        ),
    }
}
