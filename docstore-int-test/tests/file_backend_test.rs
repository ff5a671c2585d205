use docstore::collection::Document;
use docstore::doc;
use docstore::filter::Filter;
use docstore::Value;
use docstore_int_test::test_util::{cleanup, create_test_context, insert_test_docs, run_test};
use std::fs;
use std::path::Path;

#[test]
fn test_persisted_layout_is_readable_plain_json_array() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let path = Path::new(ctx.path()).join("articles.json");
            let content = fs::read_to_string(&path).unwrap();

            // a single pretty-printed array of plain documents, no wrapper
            assert!(content.starts_with("[\n"));
            assert!(content.trim_end().ends_with(']'));
            assert!(content.contains("\"slug\": \"japan\""));

            let parsed: Vec<Document> = serde_json::from_str(&content).unwrap();
            assert_eq!(parsed.len(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_timestamps_persist_as_canonical_strings() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let found = store
                .find_one("articles", &Filter::new().eq("slug", "japan"))?
                .unwrap();
            assert_eq!(
                found.get("last_updated"),
                Value::from("2023-07-01T02:15:22+00:00")
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_collection_created_implicitly_on_first_write() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let path = Path::new(ctx.path()).join("fresh.json");
            assert!(!path.exists());

            store.insert_one("fresh", doc! { slug: "first" })?;
            assert!(path.exists());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_later_full_snapshot_write_wins() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let path = Path::new(ctx.path()).join("articles.json");

            // writer B loads its snapshot before writer A's update lands
            let stale_snapshot = fs::read_to_string(&path).unwrap();

            // writer A updates through the adapter
            store.update_one(
                "articles",
                &Filter::new().eq("slug", "japan"),
                &doc! { published: false },
            )?;
            let updated = store
                .find_one("articles", &Filter::new().eq("slug", "japan"))?
                .unwrap();
            assert_eq!(updated.get("published"), Value::Bool(false));

            // writer B rewrites the whole file from its stale snapshot;
            // the later write wins entirely and A's update is gone. This
            // is the specified behavior of the file backend, not a defect.
            fs::write(&path, stale_snapshot).unwrap();
            let reverted = store
                .find_one("articles", &Filter::new().eq("slug", "japan"))?
                .unwrap();
            assert_eq!(reverted.get("published"), Value::Bool(true));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_text_search_ranks_name_hits_first() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert_one(
                "articles",
                doc! { slug: "in-summary", name: "Elsewhere", summary: "All about Borduria" },
            )?;
            store.insert_one(
                "articles",
                doc! { slug: "in-name", name: "Borduria", summary: "A landlocked country" },
            )?;

            let results = store.text_search("articles", "borduria", 10)?;
            assert_eq!(results.len(), 2);
            assert_eq!(results[0].get("slug"), Value::from("in-name"));
            assert_eq!(results[1].get("slug"), Value::from("in-summary"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_text_search_respects_limit() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let results = store.text_search("articles", "visa", 1)?;
            assert_eq!(results.len(), 1);

            let unbounded = store.text_search("articles", "visa", 0)?;
            assert_eq!(unbounded.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_two_handles_see_each_others_writes() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert_one("articles", doc! { slug: "a" })?;

            // a second adapter over the same directory, as a second
            // sequential process would open it
            let other = docstore::DocStore::builder()
                .data_dir(ctx.path())
                .open()?;
            other.insert_one("articles", doc! { slug: "b" })?;
            other.close()?;

            assert_eq!(store.count_documents("articles", &Filter::all())?, 2);
            Ok(())
        },
        cleanup,
    )
}
