//! End-to-end list scenarios: canonicalization, splice algebra, reads.

mod support;

use prolly_core::{Error, Forest, MemoryStore, ScanOptions, Unkeyed};
use prolly_trees::IndexedList;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use support::{check_tree, value_id, value_ids};

fn list() -> IndexedList<MemoryStore> {
    IndexedList::new(Forest::new(MemoryStore::new()))
}

#[tokio::test]
async fn empty_round_trip() {
    let list = list();
    let empty = list.create(&[]).await.unwrap();
    assert_eq!(list.size(&empty).await.unwrap(), 0);

    let scanned = list
        .scan(&empty, ScanOptions::new())
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(scanned.is_empty());

    let items = value_ids(0..3);
    let spliced = list.splice(&empty, 0, 0, &items).await.unwrap();
    assert_eq!(spliced, list.create(&items).await.unwrap());
}

#[tokio::test]
async fn create_reads_back() {
    let list = list();
    let items = value_ids(0..10_000);
    let root = list.create(&items).await.unwrap();

    assert_eq!(list.size(&root).await.unwrap(), 10_000);
    assert_eq!(
        check_tree::<Unkeyed>(list.forest(), &root).await,
        10_000,
        "leaf elements must match size"
    );

    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..100 {
        let i = rng.gen_range(0..10_000u64);
        assert_eq!(list.at(&root, i).await.unwrap(), items[i as usize]);
    }
    assert_eq!(list.at(&root, 0).await.unwrap(), items[0]);
    assert_eq!(list.at(&root, 9_999).await.unwrap(), items[9_999]);
    match list.at(&root, 10_000).await {
        Err(Error::OutOfBounds { index, size }) => {
            assert_eq!((index, size), (10_000, 10_000));
        }
        other => panic!("expected OutOfBounds, got {other:?}"),
    }
}

#[tokio::test]
async fn scan_matches_contents() {
    let list = list();
    let items = value_ids(0..2_500);
    let root = list.create(&items).await.unwrap();

    let all = list
        .scan(&root, ScanOptions::new())
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(all, items);

    let window = list
        .scan(&root, ScanOptions::new().lo(700).hi(1_900))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(window, items[700..1_900]);

    let limited = list
        .scan(&root, ScanOptions::new().lo(700).limit(5))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(limited, items[700..705]);

    let past_end = list
        .scan(&root, ScanOptions::new().lo(5_000))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn delete_all_is_canonical() {
    let list = list();
    let root = list.create(&value_ids(0..10_000)).await.unwrap();
    let drained = list.splice(&root, 0, 10_000, &[]).await.unwrap();
    assert_eq!(drained, list.create(&[]).await.unwrap());
    assert_eq!(list.size(&drained).await.unwrap(), 0);
}

#[tokio::test]
async fn splice_equivalence() {
    let list = list();
    let xs = value_ids(0..10_000);
    let ys = value_ids(100_000..101_000);
    let root = list.create(&xs).await.unwrap();

    let spliced = list.splice(&root, 2_000, 100, &ys).await.unwrap();

    let mut expect = xs[..2_000].to_vec();
    expect.extend_from_slice(&ys);
    expect.extend_from_slice(&xs[2_100..]);
    assert_eq!(spliced, list.create(&expect).await.unwrap());
    assert_eq!(list.size(&spliced).await.unwrap(), 10_900);
}

#[tokio::test]
async fn noop_splice_returns_same_root() {
    let list = list();
    let root = list.create(&value_ids(0..3_000)).await.unwrap();
    for start in [0u64, 1, 1_500, 2_999, 3_000] {
        assert_eq!(list.splice(&root, start, 0, &[]).await.unwrap(), root);
    }
}

#[tokio::test]
async fn boundary_splices() {
    let list = list();
    let xs = value_ids(0..5_000);
    let root = list.create(&xs).await.unwrap();
    let extra = value_ids(200_000..200_010);

    // Prepend.
    let prepended = list.splice(&root, 0, 0, &extra).await.unwrap();
    let mut expect = extra.clone();
    expect.extend_from_slice(&xs);
    assert_eq!(prepended, list.create(&expect).await.unwrap());

    // Append at start == size.
    let appended = list.splice(&root, 5_000, 0, &extra).await.unwrap();
    let mut expect = xs.clone();
    expect.extend_from_slice(&extra);
    assert_eq!(appended, list.create(&expect).await.unwrap());

    // Delete count far past the end is clamped.
    let truncated = list.splice(&root, 4_000, 999_999, &[]).await.unwrap();
    assert_eq!(truncated, list.create(&xs[..4_000]).await.unwrap());

    // Start past the end is rejected.
    assert!(matches!(
        list.splice(&root, 5_001, 0, &extra).await,
        Err(Error::OutOfBounds { .. })
    ));
    // Same for the empty list.
    let empty = list.create(&[]).await.unwrap();
    assert!(matches!(
        list.splice(&empty, 1, 0, &extra).await,
        Err(Error::OutOfBounds { .. })
    ));
}

#[tokio::test]
async fn random_splices_stay_canonical() {
    let list = list();
    let mut rng = StdRng::seed_from_u64(42);
    let mut model: Vec<prolly_core::ContentId> = value_ids(0..1_000);
    let mut root = list.create(&model).await.unwrap();
    let mut fresh = 1_000_000u64;

    for round in 0..40 {
        let size = model.len() as u64;
        let start = rng.gen_range(0..=size);
        let delete = rng.gen_range(0..=(size - start).min(200));
        let insert: Vec<_> = (0..rng.gen_range(0..120u64))
            .map(|_| {
                fresh += 1;
                value_id(fresh)
            })
            .collect();

        root = list.splice(&root, start, delete, &insert).await.unwrap();
        model.splice(start as usize..(start + delete) as usize, insert);

        assert_eq!(
            root,
            list.create(&model).await.unwrap(),
            "divergence after round {round}"
        );
    }
    assert_eq!(
        check_tree::<Unkeyed>(list.forest(), &root).await,
        model.len() as u64
    );
}
