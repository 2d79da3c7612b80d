use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::arena::TreeArena;
use crate::node::NodeId;
use crate::sequence::ChildSequence;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // config source parsing is noisy at trace level
    let noisy_modules = ["config::"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Builds the reference hierarchy used throughout the tests.
///
/// ```text
/// f(0)
/// ├── b(2)
/// │   ├── a(1)
/// │   └── d(4)
/// │       ├── c(3)
/// │       └── e(5)
/// └── g(6)
///     └── i(7)
///         └── h(8)
/// ```
///
/// `h` is a leaf, every other node a composite. Returns the arena and `f`.
pub fn scenario_tree<S: ChildSequence>() -> (TreeArena<i32, S>, NodeId) {
    let mut tree = TreeArena::new();
    let f = tree.insert_composite(0);
    let b = tree.insert_composite(2);
    let a = tree.insert_composite(1);
    let d = tree.insert_composite(4);
    let c = tree.insert_composite(3);
    let e = tree.insert_composite(5);
    let g = tree.insert_composite(6);
    let i = tree.insert_composite(7);
    let h = tree.insert_leaf(8);

    tree.extend(f, [b, g]);
    tree.extend(b, [a, d]);
    tree.extend(d, [c, e]);
    tree.push_back(g, i);
    tree.push_back(i, h);
    (tree, f)
}

/// Payloads of `ids`, resolved through references; null references are skipped.
pub fn payloads<T: Clone, S: ChildSequence>(
    tree: &TreeArena<T, S>,
    ids: impl IntoIterator<Item = NodeId>,
) -> Vec<T> {
    ids.into_iter()
        .filter_map(|id| tree.payload(id).cloned())
        .collect()
}
