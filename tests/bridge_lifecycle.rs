//! End-to-end lifecycle tests for the wrap/unwrap bridge.

use kitbridge::dom::{Document, Element, Text};
use kitbridge::{Bridge, BridgeConfig, IdentityKey, NativeTree, TypedBridge};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup() -> (NativeTree, Bridge) {
    init_tracing();
    (
        NativeTree::new(),
        Bridge::with_config(BridgeConfig::new().with_audit(true)),
    )
}

#[test]
fn identity_is_stable_while_wrapper_lives() {
    let (mut tree, mut bridge) = setup();
    let div = tree.insert_root(Element::new("div"));

    let first = bridge.get_or_create::<Element>(&mut tree, Some(div));
    for _ in 0..10 {
        assert_eq!(bridge.get_or_create::<Element>(&mut tree, Some(div)), first);
    }
    assert_eq!(bridge.ref_count(first.unwrap()), Some(11));
    assert_eq!(bridge.live_wrappers(), 1);
}

#[test]
fn null_inputs_give_null_results() {
    let (mut tree, mut bridge) = setup();

    assert_eq!(bridge.get_or_create::<Element>(&mut tree, None), None);
    assert_eq!(bridge.unwrap::<Element>(None), None);
    assert_eq!(bridge.registered(), 0);
}

#[test]
fn unwrap_fails_after_native_destroyed() {
    let (mut tree, mut bridge) = setup();
    let div = tree.insert_root(Element::new("div"));
    let wrapper = bridge.get_or_create::<Element>(&mut tree, Some(div));

    bridge.destroy_native(&mut tree, div).unwrap();

    assert_eq!(bridge.unwrap::<Element>(wrapper), None);
    assert!(bridge.unwrap_ref::<Element>(&tree, wrapper).is_none());
    // The object no longer exists, so no new wrapper can be made for it.
    assert_eq!(bridge.get_or_create::<Element>(&mut tree, Some(div)), None);
}

#[test]
fn stale_id_never_aliases_reused_slot() {
    let (mut tree, mut bridge) = setup();
    let old = tree.insert_root(Element::new("old"));
    let old_wrapper = bridge.get_or_create::<Element>(&mut tree, Some(old));
    bridge.destroy_native(&mut tree, old).unwrap();

    let new = tree.insert_root(Element::new("new"));
    assert_eq!(old.index(), new.index());

    assert_eq!(bridge.get_or_create::<Element>(&mut tree, Some(old)), None);
    let new_wrapper = bridge.get_or_create::<Element>(&mut tree, Some(new));
    assert_ne!(new_wrapper, old_wrapper);
    assert_eq!(bridge.unwrap::<Element>(new_wrapper), Some(new));
    assert_eq!(bridge.unwrap::<Element>(old_wrapper), None);
}

#[test]
fn released_wrapper_is_replaced_by_a_new_one() {
    let (mut tree, mut bridge) = setup();
    let div = tree.insert_root(Element::new("div"));

    let w1 = bridge.get_or_create::<Element>(&mut tree, Some(div)).unwrap();
    assert!(bridge.release(&mut tree, w1));
    assert!(tree.contains(div));

    let w2 = bridge.get_or_create::<Element>(&mut tree, Some(div)).unwrap();
    assert_ne!(w1, w2);
    assert_eq!(bridge.unwrap::<Element>(Some(w2)), Some(div));
    assert_eq!(bridge.unwrap::<Element>(Some(w1)), None);
}

#[test]
fn wrapper_survives_until_last_release() {
    let (mut tree, mut bridge) = setup();
    let div = tree.insert_root(Element::new("div"));
    let wrapper = bridge.get_or_create::<Element>(&mut tree, Some(div)).unwrap();
    assert!(bridge.add_ref(wrapper));

    assert!(!bridge.release(&mut tree, wrapper));
    assert_eq!(bridge.unwrap::<Element>(Some(wrapper)), Some(div));
    assert!(bridge.release(&mut tree, wrapper));
    assert_eq!(bridge.registered(), 0);
}

#[test]
fn unwrap_checks_family() {
    let (mut tree, mut bridge) = setup();
    let doc = tree.insert_root(Document::new("about:blank"));
    let wrapper = bridge.get_or_create::<Document>(&mut tree, Some(doc));

    assert_eq!(bridge.unwrap::<Element>(wrapper), None);
    assert_eq!(bridge.unwrap::<Text>(wrapper), None);
    assert!(bridge.unwrap_ref::<Element>(&tree, wrapper).is_none());
    assert_eq!(bridge.unwrap::<Document>(wrapper), Some(doc));
}

#[test]
fn registry_does_not_leak_across_churn() {
    let (mut tree, mut bridge) = setup();
    let keep = tree.insert_root(Element::new("keep"));
    bridge.get_or_create::<Element>(&mut tree, Some(keep));

    for cycle in 0..100 {
        let node = tree.insert_root(Text::new(format!("t{cycle}")));
        let wrapper = bridge.get_or_create::<Text>(&mut tree, Some(node)).unwrap();
        if cycle % 2 == 0 {
            bridge.destroy_native(&mut tree, node).unwrap();
            bridge.release(&mut tree, wrapper);
        } else {
            bridge.release(&mut tree, wrapper);
            bridge.destroy_native(&mut tree, node).unwrap();
        }
    }

    assert_eq!(bridge.registered(), 1);
    assert_eq!(bridge.live_wrappers(), 1);
    assert_eq!(tree.len(), 1);
    assert_eq!(bridge.audit(&tree), Ok(()));
}

#[test]
fn subtree_teardown_invalidates_every_wrapper() {
    let (mut tree, mut bridge) = setup();
    let doc = tree.insert_root(Document::new("https://example.org"));
    let body = tree.append_child(doc, Element::new("body")).unwrap();
    let para = tree.append_child(body, Element::new("p")).unwrap();
    let text = tree.append_child(para, Text::new("hello")).unwrap();

    let wrappers = [
        bridge.get_or_create::<Document>(&mut tree, Some(doc)),
        bridge.get_or_create::<Element>(&mut tree, Some(body)),
        bridge.get_or_create::<Element>(&mut tree, Some(para)),
        bridge.get_or_create::<Text>(&mut tree, Some(text)),
    ];
    assert_eq!(bridge.registered(), 4);

    assert_eq!(bridge.destroy_native(&mut tree, body), Ok(3));

    assert_eq!(bridge.registered(), 1);
    assert_eq!(bridge.unwrap::<Document>(wrappers[0]), Some(doc));
    assert_eq!(bridge.unwrap::<Element>(wrappers[1]), None);
    assert_eq!(bridge.unwrap::<Element>(wrappers[2]), None);
    assert_eq!(bridge.unwrap::<Text>(wrappers[3]), None);
    assert!(tree.children(doc).is_empty());
}

#[test]
fn typed_bridge_round_trip() {
    let (mut tree, mut bridge) = setup();
    let node = tree.insert_root(Text::new("abc"));

    let wrapper = TypedBridge::<Text>::kit(&mut bridge, &mut tree, Some(node));
    let text = TypedBridge::<Text>::core_ref(&bridge, &tree, wrapper).unwrap();

    assert_eq!(text.data, "abc");
}

#[test]
fn scenario_n1() {
    let (mut tree, mut bridge) = setup();
    let n1 = tree.insert_root(Element::new("n1"));

    let a = bridge.get_or_create::<Element>(&mut tree, Some(n1));
    let b = bridge.get_or_create::<Element>(&mut tree, Some(n1));
    assert!(a.is_some());
    assert_eq!(a, b);

    bridge.destroy_native(&mut tree, n1).unwrap();

    assert_eq!(bridge.unwrap::<Element>(a), None);
    assert!(!bridge.registry().contains(&IdentityKey::of::<Element>(n1)));
}

#[test]
fn nodes_in_different_trees_never_share_a_wrapper() {
    let (mut a, mut bridge) = setup();
    let mut b = NativeTree::new();
    let na = a.insert_root(Element::new("a"));
    let nb = b.insert_root(Element::new("b"));

    let wa = bridge.get_or_create::<Element>(&mut a, Some(na));
    let wb = bridge.get_or_create::<Element>(&mut b, Some(nb));
    assert!(wa.is_some());
    assert_ne!(wa, wb);
    assert!(b.hooks(nb).is_empty());

    // A tree gets its own bridge.
    let mut other = Bridge::new();
    let wb = other.get_or_create::<Element>(&mut b, Some(nb));
    assert_eq!(b.hooks(nb).len(), 1);

    other.destroy_native(&mut b, nb).unwrap();
    assert_eq!(other.unwrap::<Element>(wb), None);
    assert_eq!(bridge.unwrap::<Element>(wa), Some(na));
    assert_eq!(bridge.audit(&a), Ok(()));
}
