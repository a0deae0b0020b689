use cdkey_core::types::{Config, NewPack};
use cdkey_core::{CdkeyError, Registry};
use std::thread;
use tempfile::TempDir;

fn open_with_packs(names: &[&str]) -> (Registry, TempDir) {
    let temp = TempDir::new().unwrap();
    let registry = Registry::open(Config::new(temp.path())).unwrap();
    for name in names {
        registry
            .add_pack(&NewPack {
                name: name.to_string(),
                prefix: "C".to_string(),
                key_len: 8,
                pack_size: 50,
                note: String::new(),
            })
            .unwrap();
        registry.enable_pack(name).unwrap();
    }
    (registry, temp)
}

/// Racing redemptions of one code produce a single success.
#[test]
fn same_code_single_winner() {
    let (registry, _temp) = open_with_packs(&["p1"]);
    let codes: Vec<String> = registry
        .list_keys("p1")
        .unwrap()
        .into_iter()
        .map(|r| r.key.to_string())
        .collect();

    for code in codes.iter().take(10) {
        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| registry.use_key("p1", code)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1, "{code}");
        assert!(
            results
                .iter()
                .filter(|r| r.is_err())
                .all(|r| matches!(r, Err(CdkeyError::KeyUsed { .. })))
        );
    }
}

/// Every code in several packs is redeemed exactly once under contention.
#[test]
fn parallel_packs() {
    let names = ["a", "b", "c"];
    let (registry, _temp) = open_with_packs(&names);

    let successes: usize = thread::scope(|s| {
        let handles: Vec<_> = names
            .iter()
            .flat_map(|name| [*name, *name])
            .map(|name| {
                let registry = &registry;
                s.spawn(move || {
                    let keys = registry.list_keys(name).unwrap();
                    keys.iter()
                        .filter(|r| registry.use_key(name, &r.key).is_ok())
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(successes, 3 * 50);
}

/// Admin changes interleaved with redemptions leave the registry consistent.
#[test]
fn add_and_remove_during_redemption() {
    let (registry, _temp) = open_with_packs(&["busy"]);
    let codes: Vec<String> = registry
        .list_keys("busy")
        .unwrap()
        .into_iter()
        .map(|r| r.key.to_string())
        .collect();

    thread::scope(|s| {
        s.spawn(|| {
            for code in &codes {
                registry.use_key("busy", code).unwrap();
            }
        });
        s.spawn(|| {
            for i in 0..5 {
                let name = format!("temp{i}");
                registry
                    .add_pack(&NewPack {
                        name: name.clone(),
                        prefix: "T".to_string(),
                        key_len: 6,
                        pack_size: 10,
                        note: String::new(),
                    })
                    .unwrap();
                registry.remove_pack(&name).unwrap();
            }
        });
    });

    assert_eq!(registry.len(), 1);
    assert!(registry
        .list_keys("busy")
        .unwrap()
        .iter()
        .all(|r| !r.status.is_ready()));
}
