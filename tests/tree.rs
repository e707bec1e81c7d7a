use merkle_avl::{Error, Tree};
use sha2::{Digest, Sha256};

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[test]
fn empty_tree() {
    let tree = Tree::new();

    assert_eq!(tree.size(), 0);
    assert_eq!(tree.root_hash(), None);
    assert_eq!(tree.lookup("starfish"), Err(Error::KeyNotFound { key: b"starfish".to_vec() }));

    let proof = tree.audit("starfish");

    assert!(proof.path.is_none());
    assert!(!proof.verify("anything"));
}

#[test]
fn singleton() {
    let tree = Tree::new().insert("starfish", b"blue".to_vec());

    assert_eq!(tree.size(), 1);
    assert_eq!(
        tree.root_hash(),
        Some("3755b417b0f937026ac1b867a397d6dec80dfd463c232c2daaf1de974b93da82")
    );

    let proof = tree.audit("starfish");
    assert_eq!(proof.path, Some(Vec::new()));
    assert!(proof.verify(tree.root_hash().unwrap()));
}

#[test]
fn pair_orders_by_key() {
    let tree = Tree::new()
        .insert("starfish", b"blue".to_vec())
        .insert("centipede", b"long".to_vec());

    assert_eq!(tree.keys(), vec![b"centipede".to_vec(), b"starfish".to_vec()]);

    let left = sha256_hex(b"centipede");
    let right = sha256_hex(b"starfish");
    let expected = sha256_hex(format!("{left}{right}").as_bytes());

    assert_eq!(tree.root_hash(), Some(expected.as_str()));
}

#[test]
fn update_replaces_value_not_structure() {
    let before = Tree::new().insert("starfish", b"blue".to_vec());
    let after = before.clone().insert("starfish", b"green".to_vec());

    assert_eq!(after.size(), 1);
    assert_eq!(after.lookup("starfish").unwrap(), b"green");
    assert_eq!(before.root_hash(), after.root_hash());
}

#[test]
fn balanced_build_twenty_round_trips_every_proof() {
    let keys: Vec<String> = (0..20).map(|i| format!("key-{i:03}")).collect();
    let mut order = keys.clone();

    // a fixed, non-sorted permutation rather than the identity order
    order.sort_by_key(|k| {
        let mut h = 0u64;
        for b in k.bytes() {
            h = h.wrapping_mul(31).wrapping_add(b as u64);
        }
        h
    });

    let mut tree = Tree::new();
    for k in &order {
        tree = tree.insert(k, b"v".to_vec());
    }

    assert_eq!(tree.size(), 20);

    let root = tree.root_hash().unwrap().to_string();
    let expected = 20f64.log2().floor() as i64;

    for k in &keys {
        let proof = tree.audit(k);
        assert!(proof.verify(&root), "proof for {k} failed to verify");

        let len = proof.path.as_ref().unwrap().len() as i64;
        assert!(
            (len - expected).abs() <= 1,
            "audit path for {k} has length {len}, expected within 1 of {expected}"
        );
    }
}

#[test]
fn deleting_any_key_leaves_the_rest_reachable() {
    let all = ["ant", "bee", "cat", "dog", "eel", "fox"];

    let mut tree = Tree::new();
    for k in all {
        tree = tree.insert(k, b"v".to_vec());
    }

    // Exercise deleting each key (including whichever one the root's
    // search key happens to name, without needing to know which that is):
    // every other key must still resolve and verify afterward.
    for deleted in all {
        let after = tree.clone().delete(deleted).unwrap();

        assert!(after.lookup(deleted).is_err());
        assert_eq!(after.size(), all.len() - 1);

        let root = after.root_hash().unwrap().to_string();

        for k in all {
            if k == deleted {
                continue;
            }

            assert!(after.lookup(k).is_ok());
            assert!(after.audit(k).verify(&root));
        }
    }
}

#[test]
fn delete_then_insert_restores_key_set() {
    let mut tree = Tree::new();
    for k in ["ant", "bee", "cat", "dog"] {
        tree = tree.insert(k, b"v".to_vec());
    }

    let before_keys = tree.keys();

    tree = tree.delete("bee").unwrap();
    tree = tree.insert("bee", b"v".to_vec());

    assert_eq!(tree.keys(), before_keys);
}

#[test]
fn lookup_missing_key_is_not_found() {
    let tree = Tree::new().insert("starfish", b"blue".to_vec());

    assert_eq!(
        tree.lookup("centipede"),
        Err(Error::KeyNotFound { key: b"centipede".to_vec() })
    );
}

#[test]
fn delete_missing_key_is_not_found() {
    let tree = Tree::new().insert("starfish", b"blue".to_vec());

    assert_eq!(
        tree.delete("centipede").unwrap_err(),
        Error::KeyNotFound { key: b"centipede".to_vec() }
    );
}

#[test]
fn duplicate_key_in_bulk_build_is_rejected() {
    let err = Tree::new_from_pairs([("a", b"1".to_vec()), ("a", b"2".to_vec())]).unwrap_err();

    assert_eq!(err, Error::DuplicateKey { key: b"a".to_vec() });
}

#[test]
fn bulk_build_matches_incremental_insert_keys_and_membership() {
    let pairs: Vec<(String, Vec<u8>)> = (0..15).map(|i| (format!("k{i:02}"), vec![i as u8])).collect();

    let bulk = Tree::new_from_pairs(pairs.clone()).unwrap();

    let mut incremental = Tree::new();
    for (k, v) in &pairs {
        incremental = incremental.insert(k, v.clone());
    }

    assert_eq!(bulk.size(), incremental.size());
    assert_eq!(bulk.keys(), incremental.keys());

    for (k, v) in &pairs {
        assert_eq!(bulk.lookup(k).unwrap(), v);
    }
}
