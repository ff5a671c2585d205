use docstore::collection::Document;
use docstore::doc;
use docstore::filter::Filter;
use docstore::{SortOrder, Value};
use docstore_int_test::test_util::{
    cleanup, create_test_context, insert_test_docs, is_sorted, run_test,
};

fn slugs(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .map(|doc| doc.get("slug").as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_pagination_slices_sorted_sequence() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let full = store
                .find("articles", Filter::all())?
                .sort("rank", SortOrder::Ascending)
                .to_list()?;
            assert_eq!(slugs(&full), vec!["brazil", "norway", "japan"]);

            for skip in 0..4u64 {
                for limit in 0..4u64 {
                    let page = store
                        .find("articles", Filter::all())?
                        .sort("rank", SortOrder::Ascending)
                        .skip(skip)
                        .limit(limit)
                        .to_list()?;

                    let start = (skip as usize).min(full.len());
                    let expected = if limit == 0 {
                        &full[start..]
                    } else {
                        &full[start..(start + limit as usize).min(full.len())]
                    };
                    assert_eq!(page, expected, "skip={} limit={}", skip, limit);
                }
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filter_applies_before_pagination() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let page = store
                .find("articles", Filter::new().eq("published", true))?
                .sort("name", SortOrder::Ascending)
                .skip(1)
                .to_list()?;
            // published sorted by name: [brazil, japan] -> skip 1 -> [japan]
            assert_eq!(slugs(&page), vec!["japan"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_skip_past_end_yields_empty_sequence() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let page = store.find("articles", Filter::all())?.skip(100).to_list()?;
            assert!(page.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_descending_and_default_ascending() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let names: Vec<Value> = store
                .find("articles", Filter::all())?
                .sort("name", SortOrder::Descending)
                .to_list()?
                .iter()
                .map(|doc| doc.get("name"))
                .collect();
            assert!(is_sorted(names, false));

            let ranks: Vec<Value> = store
                .find("articles", Filter::all())?
                .sort("rank", SortOrder::Ascending)
                .to_list()?
                .iter()
                .map(|doc| doc.get("rank"))
                .collect();
            assert!(is_sorted(ranks, true));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_is_stable_for_equal_keys() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            for slug in ["first", "second", "third"] {
                store.insert_one("articles", doc! { slug: slug, group: "same" })?;
            }

            let sorted = store
                .find("articles", Filter::all())?
                .sort("group", SortOrder::Ascending)
                .to_list()?;
            // equal sort keys keep natural (insertion) order
            assert_eq!(slugs(&sorted), vec!["first", "second", "third"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_sort_field_sorts_as_empty_string() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert_one("articles", doc! { slug: "titled", title: "Borders" })?;
            store.insert_one("articles", doc! { slug: "untitled" })?;

            let sorted = store
                .find("articles", Filter::all())?
                .sort("title", SortOrder::Ascending)
                .to_list()?;
            assert_eq!(slugs(&sorted), vec!["untitled", "titled"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_chain_order_irrelevant_and_last_set_wins() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let one = store
                .find("articles", Filter::all())?
                .limit(2)
                .sort("rank", SortOrder::Ascending)
                .skip(1)
                .to_list()?;
            let two = store
                .find("articles", Filter::all())?
                .skip(1)
                .limit(5)
                .limit(2)
                .sort("slug", SortOrder::Descending)
                .sort("rank", SortOrder::Ascending)
                .to_list()?;

            assert_eq!(one, two);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cursor_rereads_collection_on_every_materialization() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let cursor = store.find("articles", Filter::all())?;
            assert_eq!(cursor.to_list()?.len(), 3);

            store.insert_one("articles", doc! { slug: "iceland", rank: 4 })?;
            assert_eq!(cursor.to_list()?.len(), 4);

            store.delete_many("articles", &Filter::all())?;
            assert!(cursor.to_list()?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_materialization_does_not_mutate_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let _ = store
                .find("articles", Filter::new().eq("published", true))?
                .sort("name", SortOrder::Descending)
                .limit(1)
                .to_list()?;

            assert_eq!(store.count_documents("articles", &Filter::all())?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_text_filter_through_cursor() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            insert_test_docs(&store, "articles")?;

            let matches = store
                .find("articles", Filter::new().text("VISA"))?
                .sort("slug", SortOrder::Ascending)
                .to_list()?;
            assert_eq!(slugs(&matches), vec!["brazil", "japan"]);
            Ok(())
        },
        cleanup,
    )
}
