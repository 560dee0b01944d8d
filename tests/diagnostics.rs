//! Verbose diagnostics emitted through `tracing`

use std::io;
use std::sync::{Arc, Mutex};

use islet::{
    observer_fn, AllocOptions, ErrorHandling, RemoveOptions, Store, StoreStack, UseStoreOptions,
};
use tracing::Level;

/// Shared buffer the fmt subscriber writes into.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a warn-level subscriber and return everything it logged.
fn capture_warnings<F: FnOnce()>(f: F) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(Level::WARN)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    captured.contents()
}

#[test]
fn verbose_collision_warns() {
    let stack = StoreStack::new();
    stack
        .add_store_at_pointer(Store::new(1), "taken", AllocOptions::default())
        .unwrap();

    let logs = capture_warnings(|| {
        let result = stack.add_store_at_pointer(
            Store::new(2),
            "taken",
            AllocOptions::default().with_verbose(true),
        );
        assert!(result.is_err());
    });

    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("pointer is already allocated"), "{logs}");
    assert!(logs.contains("taken"), "{logs}");
}

#[test]
fn quiet_collision_logs_nothing() {
    let stack = StoreStack::new();
    stack
        .add_store_at_pointer(Store::new(1), "taken", AllocOptions::default())
        .unwrap();

    let logs = capture_warnings(|| {
        let result = stack.add_store_at_pointer(Store::new(2), "taken", AllocOptions::default());
        assert!(result.is_err());
    });

    assert!(logs.is_empty(), "{logs}");
}

#[test]
fn verbose_removal_of_absent_pointer_warns() {
    let stack = StoreStack::new();

    let logs = capture_warnings(|| {
        assert!(stack.remove_store("zz", RemoveOptions::verbose()).is_err());
    });

    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("pointer is not allocated"), "{logs}");
    assert!(logs.contains("zz"), "{logs}");
}

#[test]
fn quiet_removal_of_absent_pointer_logs_nothing() {
    let stack = StoreStack::new();

    let logs = capture_warnings(|| {
        assert!(stack.remove_store("zz", RemoveOptions::default()).is_err());
    });

    assert!(logs.is_empty(), "{logs}");
}

fn join_twice_with(error_handling: ErrorHandling) -> String {
    let stack = StoreStack::new();
    let observer = observer_fn(|_: &Store<i32>| {});
    let options = || {
        UseStoreOptions::new()
            .pointer("shared")
            .observer(Arc::clone(&observer))
    };
    stack.use_store_with(0, options()).unwrap();

    capture_warnings(|| {
        let pointer = stack
            .use_store_with(0, options().error_handling(error_handling))
            .unwrap();
        assert_eq!(pointer, "shared");
    })
}

#[test]
fn verbose_use_store_warns_on_duplicate_observer() {
    let logs = join_twice_with(ErrorHandling::verbose());

    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("use_store could not attach observer"), "{logs}");
    assert!(logs.contains("shared"), "{logs}");
    assert!(logs.contains("already attached"), "{logs}");
}

#[test]
fn default_use_store_swallows_duplicate_silently() {
    let logs = join_twice_with(ErrorHandling::default());

    assert!(logs.is_empty(), "{logs}");
}
