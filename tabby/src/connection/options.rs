/// Options accepted by [connect](crate::connect) and
/// [ConnectionBuilder::options](crate::connection::ConnectionBuilder::options).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    use_modern_client: bool,
    pluralize: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        ConnectOptions {
            use_modern_client: false,
            pluralize: true,
        }
    }
}

impl ConnectOptions {
    pub fn new() -> Self {
        ConnectOptions::default()
    }

    /// Selects the modern connection-handling mode. Leaving it off only logs
    /// a deprecation warning at connect time; stored data is the same.
    pub fn use_modern_client(mut self, enabled: bool) -> Self {
        self.use_modern_client = enabled;
        self
    }

    /// Derive collection names by pluralizing model names (`Cat` to `cats`).
    /// When off, the model name is used as is.
    pub fn pluralize(mut self, enabled: bool) -> Self {
        self.pluralize = enabled;
        self
    }

    pub fn is_modern_client(&self) -> bool {
        self.use_modern_client
    }

    pub fn is_pluralize(&self) -> bool {
        self.pluralize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ConnectOptions::new();
        assert!(!options.is_modern_client());
        assert!(options.is_pluralize());
    }

    #[test]
    fn chained_setters() {
        let options = ConnectOptions::new().use_modern_client(true).pluralize(false);
        assert!(options.is_modern_client());
        assert!(!options.is_pluralize());
    }
}
