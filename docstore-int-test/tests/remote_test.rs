//! Tests that exercise the remote backend against a live deployment at
//! mongodb://localhost:27017. Run with `--features remote`.
#![cfg(feature = "remote")]

use docstore::doc;
use docstore::filter::Filter;
use docstore::store::BackendKind;
use docstore::{DocStore, SortOrder, Value};
use docstore_int_test::test_util::random_path;

fn open_remote_store() -> DocStore {
    DocStore::builder()
        .remote_uri("mongodb://localhost:27017")
        .database(&format!("docstore_test_{}", uuid::Uuid::new_v4().simple()))
        .data_dir(random_path())
        .sequence_fields(&["sections", "assets"])
        .open()
        .expect("open against local deployment")
}

#[test]
fn test_remote_backend_selected_when_reachable() {
    let store = open_remote_store();
    assert_eq!(store.backend_kind().unwrap(), BackendKind::Remote);
    store.close().unwrap();
}

#[test]
fn test_remote_round_trip_matches_file_semantics() {
    let store = open_remote_store();

    for (slug, rank, published) in [("a", 2, true), ("b", 1, true), ("c", 3, false)] {
        store
            .insert_one(
                "articles",
                doc! { slug: slug, rank: rank, published: published },
            )
            .unwrap();
    }

    // normalized read: driver ObjectId stripped, slug surfaced as id
    let found = store
        .find_one("articles", &Filter::new().eq("slug", "a"))
        .unwrap()
        .unwrap();
    assert_eq!(found.get("id"), Value::from("a"));
    assert!(!found.contains_key("_id"));
    assert_eq!(found.get("sections"), Value::Array(vec![]));

    // cursor chain forwarded to the driver
    let page = store
        .find("articles", Filter::new().eq("published", true))
        .unwrap()
        .sort("rank", SortOrder::Ascending)
        .skip(1)
        .to_list()
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].get("id"), Value::from("a"));

    // result shaping
    let update = store
        .update_one(
            "articles",
            &Filter::new().eq("slug", "c"),
            &doc! { published: true },
        )
        .unwrap();
    assert_eq!(update.matched_count(), 1);

    let deleted = store.delete_many("articles", &Filter::all()).unwrap();
    assert_eq!(deleted.deleted_count(), 3);
    assert_eq!(
        store.count_documents("articles", &Filter::all()).unwrap(),
        0
    );

    store.close().unwrap();
}
