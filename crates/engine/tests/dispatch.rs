//! End-to-end behaviour of a dispatcher over a small tree: routing, typed
//! parsing, completion, help and permissions, observed through the message
//! sink and callback side effects.

use cmdtree::platform::{AllowAll, RecordingMessages, StaticPermissions};
use cmdtree::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn toks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, PartialEq)]
enum Color {
    Red,
    Green,
}

impl CommandEnum for Color {
    const VARIANTS: &'static [&'static str] = &["RED", "GREEN"];

    fn from_variant(name: &str) -> Option<Self> {
        match name {
            "RED" => Some(Color::Red),
            "GREEN" => Some(Color::Green),
            _ => None,
        }
    }
}

struct Fixture {
    dispatcher: Dispatcher,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Vec<Value>>>,
}

fn fixture() -> Fixture {
    let calls = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(Vec::new()));

    let record = {
        let calls = calls.clone();
        let last = last.clone();
        move |inv: &Invocation<'_>| {
            calls.fetch_add(1, Ordering::SeqCst);
            *last.lock().unwrap() = inv.args().values().to_vec();
        }
    };

    let mut root: Node = GroupNode::new("shop", "Shop commands", "shop")
        .child(
            ActionNode::new("give", "Give items", "shop")
                .param(Parameter::string("player").with_static_suggestions(["alice", "Albert", "bob"]))
                .param(Parameter::int("amount"))
                .param(Parameter::bool("notify")),
        )
        .child(ActionNode::new("take", "Take items", "shop").param(Parameter::string("player")))
        .child(ActionNode::new("note", "Leave a note", "shop").param(Parameter::quoted("text")))
        .child(ActionNode::new("say", "Broadcast", "shop").param(Parameter::greedy("message")))
        .child(ActionNode::new("paint", "Pick a color", "shop").param(Parameter::enum_of::<Color>("color")))
        .child(
            HybridNode::new("settings", "Show or change settings", "shop")
                .child(ActionNode::new("reset", "Reset settings", "shop")),
        )
        .into();

    for path in [
        &["give"][..],
        &["take"],
        &["note"],
        &["say"],
        &["paint"],
        &["settings"],
        &["settings", "reset"],
    ] {
        root.bind(path, record.clone()).unwrap();
    }

    Fixture {
        dispatcher: Dispatcher::new("shop", root),
        calls,
        last,
    }
}

fn recording() -> (Arc<RecordingMessages>, DispatchContext) {
    let rec = Arc::new(RecordingMessages::new());
    let ctx = DispatchContext::new(Box::new(AllowAll), Box::new(rec.clone()));
    (rec, ctx)
}

#[test]
fn short_input_reports_first_missing_parameter() {
    let f = fixture();
    let (rec, ctx) = recording();
    let who = Identity::console();

    for (input, missing) in [
        (vec![], "player"),
        (vec!["alice"], "amount"),
        (vec!["alice", "3"], "notify"),
    ] {
        rec.clear();
        let mut tokens = toks(&["give"]);
        tokens.extend(toks(&input));
        let r = f.dispatcher.invoke(&ctx, &who, &tokens);
        assert_eq!(r.status, Status::Error);
        assert_eq!(rec.texts(), vec![format!("[shop] Missing parameter: {}", missing)]);
    }
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn quoted_string_joins_tokens() {
    let f = fixture();
    let (_, ctx) = recording();
    let r = f
        .dispatcher
        .invoke(&ctx, &Identity::console(), &toks(&["note", "\"a", "b\""]));
    assert_eq!(r.status, Status::Pass);
    assert_eq!(*f.last.lock().unwrap(), vec![Value::String("a b".into())]);
}

#[test]
fn lone_quote_is_empty_content() {
    let f = fixture();
    let (rec, ctx) = recording();
    let r = f.dispatcher.invoke(&ctx, &Identity::console(), &toks(&["note", "\""]));
    assert_eq!(r.error.unwrap().code, ErrorCode::MalformedQuotedString);
    assert_eq!(
        rec.texts(),
        vec!["[shop] Quoted string for 'text' is missing content and end quote."]
    );
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn greedy_joins_with_single_spaces() {
    let f = fixture();
    let (_, ctx) = recording();
    f.dispatcher
        .invoke(&ctx, &Identity::console(), &toks(&["say", "hello", "world"]));
    assert_eq!(*f.last.lock().unwrap(), vec![Value::String("hello world".into())]);
}

#[test]
fn boolean_has_its_own_error() {
    let f = fixture();
    let (rec, ctx) = recording();
    let who = Identity::console();

    let r = f.dispatcher.invoke(&ctx, &who, &toks(&["give", "alice", "3", "TrUe"]));
    assert_eq!(r.status, Status::Pass);
    assert_eq!(f.last.lock().unwrap()[2], Value::Bool(true));

    let r = f.dispatcher.invoke(&ctx, &who, &toks(&["give", "alice", "3", "1"]));
    assert_eq!(r.error.unwrap().code, ErrorCode::InvalidBoolean);
    assert!(rec.texts().last().unwrap().contains("boolean parameter 'notify'"));
}

#[test]
fn enum_is_uppercased_before_lookup() {
    let f = fixture();
    let (rec, ctx) = recording();
    let who = Identity::console();

    for raw in ["red", "RED", "Red"] {
        let r = f.dispatcher.invoke(&ctx, &who, &toks(&["paint", raw]));
        assert_eq!(r.status, Status::Pass);
        let args = Arguments::new(f.last.lock().unwrap().clone());
        assert_eq!(args.enumeration::<Color>(0), Some(Color::Red));
    }

    let r = f.dispatcher.invoke(&ctx, &who, &toks(&["paint", "blue"]));
    assert_eq!(r.error.unwrap().code, ErrorCode::InvalidEnum);
    assert!(rec
        .texts()
        .last()
        .unwrap()
        .ends_with("Expected one of: RED, GREEN"));
}

#[test]
fn child_lookup_is_exact_case() {
    let f = fixture();
    let (rec, ctx) = recording();
    let r = f.dispatcher.invoke(&ctx, &Identity::console(), &toks(&["GIVE"]));
    assert_eq!(r.error.unwrap().code, ErrorCode::UnknownSubcommand);
    assert_eq!(rec.texts(), vec!["[shop] Unknown subcommand: GIVE"]);
}

#[test]
fn empty_input_at_group_suggests_help() {
    let f = fixture();
    let (rec, ctx) = recording();
    let r = f.dispatcher.invoke(&ctx, &Identity::console(), &[]);
    assert_eq!(r.error.unwrap().code, ErrorCode::MissingSubcommand);
    assert_eq!(rec.texts(), vec!["[shop] Missing subcommand. Try /shop help"]);
}

#[test]
fn completion_filters_by_current_parameter() {
    let f = fixture();
    let ctx = DispatchContext::default_headless();
    let who = Identity::console();
    assert_eq!(
        f.dispatcher.complete(&ctx, &who, &toks(&["give", "AL"])),
        vec!["alice", "Albert"]
    );
    assert_eq!(
        f.dispatcher.complete(&ctx, &who, &toks(&["give", "alice", "3", "f"])),
        vec!["false"]
    );
    assert_eq!(
        f.dispatcher.complete(&ctx, &who, &toks(&["paint", "g"])),
        vec!["GREEN"]
    );
    assert_eq!(
        f.dispatcher.complete(&ctx, &who, &toks(&["s"])),
        vec!["say", "settings", "help"]
    );
    assert_eq!(
        f.dispatcher.complete(&ctx, &who, &toks(&["settings", "r"])),
        vec!["reset"]
    );
}

#[test]
fn hybrid_runs_once_without_dispatching() {
    let f = fixture();
    let (rec, ctx) = recording();
    let r = f.dispatcher.invoke(&ctx, &Identity::console(), &toks(&["settings"]));
    assert_eq!(r.status, Status::Pass);
    assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    assert!(f.last.lock().unwrap().is_empty());
    assert!(rec.texts().is_empty());
}

#[test]
fn help_is_suppressed_by_any_node_named_help() {
    let (rec, ctx) = recording();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let d = Dispatcher::new(
        "shop",
        GroupNode::new("shop", "", "shop").child(
            GroupNode::new("docs", "", "shop").child(
                ActionNode::new("help", "", "shop").on_execute(move |_| {
                    h.fetch_add(1, Ordering::SeqCst);
                }),
            ),
        ),
    );
    let r = d.invoke(&ctx, &Identity::console(), &toks(&["help"]));
    assert_eq!(r.status, Status::Error);
    assert_eq!(rec.texts(), vec!["[shop] Unknown subcommand: help"]);

    let r = d.invoke(&ctx, &Identity::console(), &toks(&["docs", "help"]));
    assert_eq!(r.status, Status::Pass);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn help_lists_visible_children() {
    let f = fixture();
    let (rec, ctx) = recording();
    let r = f.dispatcher.invoke(&ctx, &Identity::console(), &toks(&["help"]));
    assert_eq!(r.status, Status::Help);
    let lines = rec.texts();
    assert_eq!(lines[0], "Available subcommands:");
    assert!(lines.contains(&"- /shop give <player> <amount> <notify> - Give items".to_string()));
    assert_eq!(lines.last().unwrap(), "Use '/shop help tree' for more details.");
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn root_denial_short_circuits() {
    let f = fixture();
    let rec = Arc::new(RecordingMessages::new());
    let perms = StaticPermissions::new().grant("mallory", "shop.give");
    let ctx = DispatchContext::new(Box::new(perms), Box::new(rec.clone()));

    for input in [vec!["give", "alice", "x", "maybe"], vec!["help"], vec!["nope"]] {
        let r = f
            .dispatcher
            .invoke(&ctx, &Identity::new("mallory"), &toks(&input));
        assert_eq!(r.status, Status::Denied);
    }
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    assert!(rec
        .texts()
        .iter()
        .all(|t| t == "You do not have permission to use this command."));
}

#[test]
fn node_permissions_when_enforced() {
    let f = fixture();
    let rec = Arc::new(RecordingMessages::new());
    let perms = StaticPermissions::new()
        .grant("bob", "shop.shop")
        .grant("bob", "shop.say");
    let ctx = DispatchContext::new(Box::new(perms), Box::new(rec.clone())).with_node_permissions(true);
    let bob = Identity::new("bob");

    let r = f.dispatcher.invoke(&ctx, &bob, &toks(&["say", "hi"]));
    assert_eq!(r.status, Status::Pass);

    let r = f.dispatcher.invoke(&ctx, &bob, &toks(&["give", "alice", "1", "true"]));
    assert_eq!(r.status, Status::Denied);
    assert_eq!(r.error.unwrap().code, ErrorCode::PermissionDenied);
    assert_eq!(f.calls.load(Ordering::SeqCst), 1);
}
