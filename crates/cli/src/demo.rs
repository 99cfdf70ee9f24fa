//! The `inv` demo command: a small inventory manager exercising every
//! parameter kind, a nested group and a hybrid node.

use cmdtree::{
    ActionNode, BuildError, CommandDefinition, CommandEnum, GroupNode, HybridNode, Invocation,
    Node, Parameter,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemKind {
    Sword,
    Shield,
    Potion,
    Arrow,
}

impl CommandEnum for ItemKind {
    const VARIANTS: &'static [&'static str] = &["SWORD", "SHIELD", "POTION", "ARROW"];

    fn from_variant(name: &str) -> Option<Self> {
        match name {
            "SWORD" => Some(ItemKind::Sword),
            "SHIELD" => Some(ItemKind::Shield),
            "POTION" => Some(ItemKind::Potion),
            "ARROW" => Some(ItemKind::Arrow),
            _ => None,
        }
    }
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Sword => "sword",
            ItemKind::Shield => "shield",
            ItemKind::Potion => "potion",
            ItemKind::Arrow => "arrow",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub author: String,
    pub text: String,
    pub pinned: bool,
}

#[derive(Debug, Default)]
pub struct Inventory {
    /// player → item → count
    pub stock: BTreeMap<String, BTreeMap<ItemKind, i32>>,
    pub notes: Vec<Note>,
    pub verbose: bool,
    pub tax_rate: f64,
}

impl Inventory {
    pub fn players(&self) -> Vec<String> {
        self.stock.keys().cloned().collect()
    }
}

pub type SharedInventory = Arc<Mutex<Inventory>>;

fn lock(state: &SharedInventory) -> MutexGuard<'_, Inventory> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct InventoryCommand {
    label: String,
    owner: String,
    tab_complete: bool,
    state: SharedInventory,
}

impl InventoryCommand {
    pub fn new(label: &str, owner: &str, tab_complete: bool, state: SharedInventory) -> Self {
        Self {
            label: label.to_string(),
            owner: owner.to_string(),
            tab_complete,
            state,
        }
    }

    fn player_param(&self) -> Parameter {
        let state = self.state.clone();
        Parameter::string("player").with_suggestions(move || lock(&state).players())
    }
}

impl CommandDefinition for InventoryCommand {
    fn label(&self) -> &str {
        &self.label
    }

    fn tab_complete(&self) -> bool {
        self.tab_complete
    }

    fn shape(&self) -> Node {
        let owner = self.owner.as_str();
        GroupNode::new(self.label.as_str(), "Inventory commands", owner)
            .child(
                GroupNode::new("item", "Manage player items", owner)
                    .child(
                        ActionNode::new("give", "Give items to a player", owner)
                            .param(self.player_param())
                            .param(Parameter::enum_of::<ItemKind>("kind"))
                            .param(Parameter::int("amount")),
                    )
                    .child(
                        ActionNode::new("take", "Take items from a player", owner)
                            .param(self.player_param())
                            .param(Parameter::enum_of::<ItemKind>("kind"))
                            .param(Parameter::int("amount")),
                    )
                    .child(
                        ActionNode::new("list", "List a player's items", owner)
                            .param(self.player_param()),
                    ),
            )
            .child(
                ActionNode::new("note", "Leave a note", owner)
                    .param(Parameter::quoted("text"))
                    .param(Parameter::bool("pinned")),
            )
            .child(
                ActionNode::new("broadcast", "Announce a message", owner)
                    .param(Parameter::greedy("message")),
            )
            .child(
                HybridNode::new("settings", "Show or change settings", owner)
                    .child(
                        ActionNode::new("verbose", "Toggle verbose replies", owner)
                            .param(Parameter::bool("enabled")),
                    )
                    .child(
                        ActionNode::new("tax", "Set the trade tax rate", owner)
                            .param(Parameter::double("rate")),
                    ),
            )
            .into()
    }

    fn bind(&self, root: &mut Node) -> Result<(), BuildError> {
        let state = self.state.clone();
        root.bind(&["item", "give"], move |inv| give(&state, inv))?;

        let state = self.state.clone();
        root.bind(&["item", "take"], move |inv| take(&state, inv))?;

        let state = self.state.clone();
        root.bind(&["item", "list"], move |inv| list(&state, inv))?;

        let state = self.state.clone();
        root.bind(&["note"], move |inv| {
            let text = inv.args().string(0).unwrap_or_default().to_string();
            let pinned = inv.args().bool(1).unwrap_or(false);
            let mut s = lock(&state);
            s.notes.push(Note {
                author: inv.identity().name().to_string(),
                text,
                pinned,
            });
            inv.reply(&format!("Note #{} saved.", s.notes.len()));
        })?;

        root.bind(&["broadcast"], |inv| {
            let message = inv.args().string(0).unwrap_or_default();
            inv.reply(&format!("{}: {}", inv.identity(), message));
        })?;

        let state = self.state.clone();
        root.bind(&["settings"], move |inv| {
            let s = lock(&state);
            inv.reply(&format!(
                "verbose={} tax_rate={} notes={}",
                s.verbose,
                s.tax_rate,
                s.notes.len()
            ));
        })?;

        let state = self.state.clone();
        root.bind(&["settings", "verbose"], move |inv| {
            let enabled = inv.args().bool(0).unwrap_or(false);
            lock(&state).verbose = enabled;
            inv.reply(&format!("Verbose replies {}.", if enabled { "on" } else { "off" }));
        })?;

        let state = self.state.clone();
        root.bind(&["settings", "tax"], move |inv| {
            let rate = inv.args().double(0).unwrap_or(0.0);
            if !(0.0..=1.0).contains(&rate) {
                inv.reply_error("Tax rate must be between 0 and 1.");
                return;
            }
            lock(&state).tax_rate = rate;
            inv.reply(&format!("Tax rate set to {}.", rate));
        })?;

        Ok(())
    }
}

fn item_args(inv: &Invocation<'_>) -> Option<(String, ItemKind, i32)> {
    let args = inv.args();
    Some((
        args.string(0)?.to_string(),
        args.enumeration::<ItemKind>(1)?,
        args.int(2)?,
    ))
}

fn give(state: &SharedInventory, inv: &Invocation<'_>) {
    let Some((player, kind, amount)) = item_args(inv) else {
        return;
    };
    if amount <= 0 {
        inv.reply_error("Amount must be positive.");
        return;
    }
    let mut s = lock(state);
    let count = s
        .stock
        .entry(player.clone())
        .or_default()
        .entry(kind)
        .or_insert(0);
    *count = count.saturating_add(amount);
    let total = *count;
    if s.verbose {
        inv.reply(&format!("Gave {} {} to {} (now {}).", amount, kind.label(), player, total));
    } else {
        inv.reply(&format!("Gave {} {} to {}.", amount, kind.label(), player));
    }
}

fn take(state: &SharedInventory, inv: &Invocation<'_>) {
    let Some((player, kind, amount)) = item_args(inv) else {
        return;
    };
    let mut s = lock(state);
    let held = s
        .stock
        .get(&player)
        .and_then(|items| items.get(&kind))
        .copied()
        .unwrap_or(0);
    if amount <= 0 || amount > held {
        inv.reply_error(&format!("{} only has {} {}.", player, held, kind.label()));
        return;
    }
    if let Some(items) = s.stock.get_mut(&player) {
        items.insert(kind, held - amount);
    }
    inv.reply(&format!("Took {} {} from {}.", amount, kind.label(), player));
}

fn list(state: &SharedInventory, inv: &Invocation<'_>) {
    let player = inv.args().string(0).unwrap_or_default();
    let s = lock(state);
    let Some(items) = s.stock.get(player) else {
        inv.reply(&format!("{} has nothing.", player));
        return;
    };
    let summary: Vec<String> = items
        .iter()
        .filter(|(_, n)| **n > 0)
        .map(|(k, n)| format!("{} x{}", k.label(), n))
        .collect();
    if summary.is_empty() {
        inv.reply(&format!("{} has nothing.", player));
    } else {
        inv.reply(&format!("{}: {}", player, summary.join(", ")));
    }
}
