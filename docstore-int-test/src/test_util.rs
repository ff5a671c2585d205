use chrono::{DateTime, Utc};
use docstore::collection::Document;
use docstore::doc;
use docstore::errors::StoreResult;
use docstore::DocStore;
use std::time::Duration;
use std::{env, fs, thread};

#[ctor::ctor]
fn init_logging() {
    colog::init();
}

/// Runs a test with setup, teardown, and panic handling. Tests run on the
/// current thread; teardown runs whether the test passes or fails.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> StoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> StoreResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> StoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let result = std::panic::catch_unwind(|| {
        let ctx = match before() {
            Ok(ctx) => ctx,
            Err(e) => return Err(format!("Before run failed: {:?}", e)),
        };
        let test_result = test(ctx.clone());
        let after_result = after(ctx);
        match (test_result, after_result) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), _) => Err(format!("Test failed: {:?}", e)),
            (Ok(()), Err(e)) => Err(format!("After run failed: {:?}", e)),
        }
    });

    match result {
        Ok(Ok(())) => {}
        Ok(Err(message)) => panic!("{}", message),
        Err(panic_err) => {
            let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            panic!("Test panicked: {}", message);
        }
    }
}

#[derive(Clone)]
pub struct TestContext {
    path: String,
    store: DocStore,
}

impl TestContext {
    pub fn new(path: String, store: DocStore) -> Self {
        Self { path, store }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> DocStore {
        self.store.clone()
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir.join(id.to_string()).to_str().unwrap().to_string()
}

/// Opens a file-backed store over a fresh temp directory.
pub fn create_test_context() -> StoreResult<TestContext> {
    let path = random_path();
    let store = DocStore::builder()
        .data_dir(&path)
        .sequence_fields(&["sections", "assets"])
        .open()?;
    Ok(TestContext::new(path, store))
}

pub fn cleanup(ctx: TestContext) -> StoreResult<()> {
    if let Err(e) = ctx.store().close() {
        eprintln!("Warning: Failed to close store: {:?}", e);
    }

    let path = ctx.path().to_string();
    for retry in 0..5 {
        if !std::path::Path::new(&path).exists() {
            return Ok(());
        }
        match fs::remove_dir_all(&path) {
            Ok(_) => return Ok(()),
            Err(_) if retry < 4 => thread::sleep(Duration::from_millis(50 * (retry + 1))),
            Err(e) => {
                eprintln!("Warning: Failed to remove test directory {}: {:?}", path, e);
                return Ok(());
            }
        }
    }
    Ok(())
}

pub fn create_test_docs() -> Vec<Document> {
    let dt1 = parse_rfc3339("2023-07-01T02:15:22+00:00");
    let dt2 = parse_rfc3339("2021-06-12T12:05:35+00:00");
    let dt3 = parse_rfc3339("2024-04-17T22:25:44+00:00");

    let doc1 = doc! {
        slug: "japan",
        name: "Japan",
        summary: "Visa required for most travellers before arrival",
        region: "Asia",
        published: true,
        rank: 3,
        last_updated: dt1,
        sections: [ { title: "Overview", order: 1 } ],
    };

    let doc2 = doc! {
        slug: "brazil",
        name: "Brazil",
        summary: "Visa free for short stays",
        region: "South America",
        published: true,
        rank: 1,
        last_updated: dt2,
    };

    let doc3 = doc! {
        slug: "norway",
        name: "Norway",
        summary: "Schengen rules apply",
        region: "Europe",
        published: false,
        rank: 2,
        last_updated: dt3,
    };

    vec![doc1, doc2, doc3]
}

pub fn insert_test_docs(store: &DocStore, collection: &str) -> StoreResult<()> {
    for doc in create_test_docs() {
        store.insert_one(collection, doc)?;
    }
    Ok(())
}

pub fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn is_sorted<T: Ord>(iterable: impl IntoIterator<Item = T>, ascending: bool) -> bool {
    let mut iter = iterable.into_iter();
    if let Some(mut prev) = iter.next() {
        for current in iter {
            if ascending {
                if prev > current {
                    return false;
                }
            } else if prev < current {
                return false;
            }
            prev = current;
        }
    }
    true
}
