use sovran_keymap::{DependentMapExt, SharedMap, TypedKey};
use std::thread;

type Key<V> = TypedKey<SharedMap<String>, String, V>;

fn key<V>(raw: &str) -> Key<V> {
    TypedKey::new(raw.to_string())
}

#[test]
fn test_basic_operations() {
    let mut store: SharedMap<String> = SharedMap::new();
    let number: Key<i32> = key("number");

    assert!(store.is_empty());
    store.assign(&number, 42);
    assert!(store.contains_key(&"number".to_string()));
    assert_eq!(store.lookup(&number), Some(42));

    store.slot(&number).update(|n| n.map(|n| n * 2));
    assert_eq!(store.lookup(&number), Some(84));

    store.assign(&number, None);
    assert_eq!(store.len(), 0);
}

#[test]
fn test_thread_safety() {
    let store: SharedMap<String> = SharedMap::new();
    let counter: Key<i32> = key("counter");

    let mut init = store.clone();
    init.assign(&counter, 0);

    let mut handles = vec![];
    for _ in 0..10 {
        let handle = store.clone();
        let counter = counter.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                handle.with_mut(&counter, |c| *c += 1).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.lookup(&counter), Some(1000));
}

#[test]
fn test_writers_on_separate_handles() {
    let store: SharedMap<String> = SharedMap::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let mut writer = store.clone();
            thread::spawn(move || {
                let slot: Key<usize> = key(&format!("worker-{}", i));
                writer.assign(&slot, i * 10);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut keys = store.keys();
    keys.sort();
    assert_eq!(keys.len(), 8);
    assert_eq!(keys[0], "worker-0");
    assert_eq!(store.lookup(&key::<usize>("worker-7")), Some(70));
}

#[test]
fn test_type_mismatch_is_absent() {
    let mut store: SharedMap<String> = SharedMap::new();
    let text: Key<String> = key("value");
    let number: Key<i64> = key("value");

    store.assign(&text, "hello".to_string());

    assert_eq!(store.lookup(&number), None);
    assert_eq!(store.with_mut(&number, |n| *n += 1), None);
    assert_eq!(store.with(&text, |s| s.to_uppercase()).as_deref(), Some("HELLO"));
}

#[test]
fn test_default_implementation() {
    let mut store: SharedMap<String> = Default::default();
    assert!(store.is_empty());

    store.assign(&key::<i32>("test"), 42);
    assert_eq!(store.lookup(&key::<i32>("test")), Some(42));
}
