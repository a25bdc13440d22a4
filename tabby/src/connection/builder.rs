use crate::connection::{ConnectOptions, Connection, ConnectionString};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::store::memory::InMemoryStoreModule;
use crate::store::StoreModule;

/// Configures and opens a [Connection].
///
/// The in-memory module is always loaded. Errors from configuration calls
/// are captured and returned by [ConnectionBuilder::connect].
///
/// ```rust,ignore
/// let connection = Connection::builder()
///     .load_module(FjallModule::with_config().db_path("/tmp/cats").build())
///     .options(ConnectOptions::new().use_modern_client(true))
///     .connect("fjall://localhost/adopt-a-cat")?;
/// ```
pub struct ConnectionBuilder {
    error: Option<TabbyError>,
    modules: Vec<Box<dyn StoreModule>>,
    options: ConnectOptions,
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        ConnectionBuilder::new()
    }
}

impl ConnectionBuilder {
    pub fn new() -> Self {
        ConnectionBuilder {
            error: None,
            modules: vec![Box::new(InMemoryStoreModule::new())],
            options: ConnectOptions::default(),
        }
    }

    /// Registers a store module for its scheme, replacing any module
    /// already registered for the same scheme.
    pub fn load_module<M: StoreModule + 'static>(mut self, module: M) -> Self {
        if self.error.is_some() {
            return self;
        }

        let scheme = module.scheme().to_ascii_lowercase();
        if scheme.is_empty() {
            log::error!("Store module has an empty scheme");
            self.error = Some(TabbyError::new(
                "Store module must declare a scheme",
                ErrorKind::InvalidOperation,
            ));
            return self;
        }

        self.modules.retain(|m| !m.scheme().eq_ignore_ascii_case(&scheme));
        log::debug!("Loaded store module for scheme {}", scheme);
        self.modules.push(Box::new(module));
        self
    }

    pub fn options(mut self, options: ConnectOptions) -> Self {
        self.options = options;
        self
    }

    /// Opens the store addressed by `uri` through the module registered
    /// for its scheme.
    pub fn connect(self, uri: &str) -> TabbyResult<Connection> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let address = ConnectionString::parse(uri)?;
        let Some(module) = self
            .modules
            .iter()
            .find(|m| m.scheme().eq_ignore_ascii_case(address.scheme()))
        else {
            log::error!("No store module registered for scheme {}", address.scheme());
            return Err(TabbyError::new(
                &format!("Unsupported scheme '{}'", address.scheme()),
                ErrorKind::UnsupportedScheme,
            ));
        };

        if !self.options.is_modern_client() {
            log::warn!(
                "Legacy connection handling is deprecated, enable use_modern_client in ConnectOptions"
            );
        }

        let store = module
            .get_store(&address)
            .and_then(|store| store.open_or_create().map(|_| store))
            .map_err(|cause| {
                log::error!("Failed to connect to {}: {}", address, cause);
                TabbyError::new_with_cause(
                    &format!("Failed to connect to '{}'", address),
                    ErrorKind::ConnectionFailed,
                    cause,
                )
            })?;

        log::info!("Connected to {} ({})", address, store.store_version()?);
        Ok(Connection::new(address, self.options, store))
    }
}
