use std::backtrace::Backtrace;
use std::sync::Once;
use std::time::{Duration, Instant};
use std::{env, fs, thread};
use tabby::connection::{ConnectOptions, Connection};
use tabby::doc;
use tabby::collection::Document;
use tabby::errors::TabbyResult;
use tabby_derive::{Convertible, Entity};

static LOGGER: Once = Once::new();

/// The record shape used throughout the integration tests.
#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
#[entity(name = "Cat")]
pub struct Cat {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub age: Option<f64>,
    #[field(name = "favoriteFoods")]
    pub favorite_foods: Vec<String>,
}

/// Installs the console logger once per test binary.
pub fn init_logger() {
    LOGGER.call_once(|| {
        let mut builder = colog::default_builder();
        builder.filter_level(log::LevelFilter::Warn);
        builder.is_test(true);
        let _ = builder.try_init();
    });
}

/// Runs `test` between `before` and `after`, retrying a failed attempt.
///
/// `after` also runs when `test` returns an error so temporary stores are
/// always cleaned up.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> TabbyResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> TabbyResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> TabbyResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    init_logger();
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx.clone())
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx.clone());
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, _bt))) => e,
            Err(panic_err) => {
                let msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                format!("Panic: {}", msg)
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    path: String,
    connection: Connection,
}

impl TestContext {
    pub fn new(path: String, connection: Connection) -> Self {
        Self { path, connection }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn connection(&self) -> Connection {
        self.connection.clone()
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    env::temp_dir()
        .join(format!("tabby_{}", id))
        .to_string_lossy()
        .to_string()
}

#[cfg(feature = "fjall")]
pub fn create_test_context() -> TabbyResult<TestContext> {
    use tabby_fjall_adapter::FjallModule;

    let path = random_path();
    let module = FjallModule::with_config()
        .data_dir(&path)
        .low_memory_preset()
        .build();

    let connection = Connection::builder()
        .load_module(module)
        .options(ConnectOptions::new().use_modern_client(true))
        .connect("fjall://localhost/adopt-a-cat")?;
    Ok(TestContext::new(path, connection))
}

#[cfg(not(feature = "fjall"))]
pub fn create_test_context() -> TabbyResult<TestContext> {
    let connection = tabby::connect(
        "memory://localhost/adopt-a-cat",
        ConnectOptions::new().use_modern_client(true),
    )?;
    Ok(TestContext::new(random_path(), connection))
}

pub fn cleanup(ctx: TestContext) -> TabbyResult<()> {
    ctx.connection().close()?;

    let path = ctx.path();
    for retry in 0..10u64 {
        if !std::path::Path::new(path).exists() {
            return Ok(());
        }
        match fs::remove_dir_all(path) {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(_) => thread::sleep(Duration::from_millis(50 * (retry + 1))),
        }
    }
    eprintln!("Warning: Failed to remove test directory {}", path);
    Ok(())
}

/// Input for the two walkthrough cats. Momo carries a `breed` the schema
/// does not declare.
pub fn dooby() -> Document {
    doc! {
        "name": "Dooby",
        "owner": "Ariel",
        "age": 8,
        "favoriteFoods": ["treats", "catnip"],
    }
}

pub fn momo() -> Document {
    doc! {
        "name": "Momo",
        "owner": "Jessica",
        "age": 7,
        "favoriteFoods": ["wet food", "everything"],
        "breed": "blah",
    }
}
