//! Persistent storage for tabby on top of the [fjall](https://docs.rs/fjall)
//! LSM-tree.
//!
//! Load [FjallModule] into a connection builder to serve `fjall://`
//! addresses. Every database is a keyspace directory, every collection a
//! partition inside it.

mod config;
mod map;
mod module;
mod store;
mod version;
mod wrapper;

pub use config::*;
pub use module::*;
pub use store::FjallStore;
pub use wrapper::FjallValueError;

#[cfg(test)]
mod tests {
    use crate::map::FjallMap;
    use crate::store::FjallStore;
    use fjall::Keyspace;
    use tabby::store::{StoreMapProvider, StoreProvider};

    pub fn random_path() -> String {
        let id = uuid::Uuid::new_v4();
        std::env::temp_dir()
            .join(format!("tabby_fjall_{}", id))
            .to_string_lossy()
            .to_string()
    }

    #[derive(Clone)]
    pub struct Context {
        path: String,
        keyspace: Option<Keyspace>,
        fjall_store: Option<FjallStore>,
        fjall_map: Option<FjallMap>,
    }

    impl Context {
        pub fn new(
            path: String,
            keyspace: Option<Keyspace>,
            fjall_store: Option<FjallStore>,
            fjall_map: Option<FjallMap>,
        ) -> Self {
            Context {
                path,
                keyspace,
                fjall_store,
                fjall_map,
            }
        }

        pub fn fjall_store(&self) -> Result<FjallStore, String> {
            self.fjall_store
                .clone()
                .ok_or_else(|| "FjallStore not available".to_string())
        }

        pub fn fjall_map(&self) -> Result<FjallMap, String> {
            self.fjall_map
                .clone()
                .ok_or_else(|| "FjallMap not available".to_string())
        }
    }

    impl Drop for Context {
        fn drop(&mut self) {
            if let Some(map) = self.fjall_map.take() {
                if let Err(e) = map.close() {
                    log::error!("Failed to close FjallMap during cleanup: {}", e);
                }
            }
            if let Some(store) = self.fjall_store.take() {
                if let Err(e) = store.close() {
                    log::error!("Failed to close FjallStore during cleanup: {}", e);
                }
            }
            drop(self.keyspace.take());
        }
    }

    pub fn run_test<T, B, A>(before: B, test: T, after: A)
    where
        T: FnOnce(Context) + std::panic::UnwindSafe,
        B: FnOnce() -> Context + std::panic::UnwindSafe,
        A: FnOnce(Context) + std::panic::UnwindSafe,
    {
        let result = std::panic::catch_unwind(|| {
            let ctx = before();
            let path = ctx.path.clone();
            test(ctx.clone());
            after(ctx.clone());
            drop(ctx);
            let _ = std::fs::remove_dir_all(&path);
        });

        if let Err(e) = result {
            let panic_msg = if let Some(msg) = e.downcast_ref::<String>() {
                msg.clone()
            } else if let Some(msg) = e.downcast_ref::<&str>() {
                msg.to_string()
            } else {
                format!("{:?}", e)
            };
            panic!("Test execution failed with panic: {}", panic_msg);
        }
    }

    #[test]
    fn harness_preserves_panic_message() {
        let caught = std::panic::catch_unwind(|| {
            run_test(
                || Context::new(random_path(), None, None, None),
                |_ctx| panic!("Dooby escaped"),
                |_ctx| {},
            );
        });

        let err = caught.err().unwrap();
        let msg = err.downcast_ref::<String>().unwrap();
        assert!(msg.contains("Test execution failed with panic"));
        assert!(msg.contains("Dooby escaped"));
    }

    #[test]
    fn empty_context_drops_cleanly() {
        let ctx = Context::new(random_path(), None, None, None);
        assert!(ctx.fjall_store().is_err());
        assert!(ctx.fjall_map().is_err());
    }
}
