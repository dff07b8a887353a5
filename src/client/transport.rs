//! Client transport seam and the scheme registry.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use url::Url;

use crate::error::HproseError;

/// Carries one request frame to the service and returns the response frame.
///
/// The codec never sees the transport; anything that can exchange byte
/// frames can back a [`Client`](super::Client).
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, uri: &Url, request: &[u8]) -> Result<Vec<u8>, HproseError>;
}

/// Builds a transport for a parsed URI.
pub type TransportFactory =
    Arc<dyn Fn(&Url) -> Result<Box<dyn Transport>, HproseError> + Send + Sync>;

static REGISTRY: OnceLock<RwLock<HashMap<String, TransportFactory>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, TransportFactory>> {
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<String, TransportFactory> = HashMap::new();
        for scheme in ["tcp", "tcp4", "tcp6"] {
            map.insert(
                scheme.to_string(),
                Arc::new(|uri: &Url| super::tcp::TcpTransport::from_uri(uri)),
            );
        }
        RwLock::new(map)
    })
}

/// Registers a transport factory for a URI scheme, replacing any previous
/// registration. This is the extension hook for additional schemes.
pub fn register_transport(scheme: &str, factory: TransportFactory) {
    registry()
        .write()
        .unwrap()
        .insert(scheme.to_lowercase(), factory);
}

/// Builds the transport selected by the URI scheme.
pub(crate) fn transport_for(uri: &Url) -> Result<Box<dyn Transport>, HproseError> {
    let factory = registry()
        .read()
        .unwrap()
        .get(&uri.scheme().to_lowercase())
        .cloned();
    match factory {
        Some(factory) => factory(uri),
        None => Err(HproseError::User(format!(
            "the {} client isn't implemented",
            uri.scheme()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Loopback;

    #[async_trait::async_trait]
    impl Transport for Loopback {
        async fn exchange(&self, _uri: &Url, request: &[u8]) -> Result<Vec<u8>, HproseError> {
            Ok(request.to_vec())
        }
    }

    #[test]
    fn builtin_schemes_resolve() {
        for uri in ["tcp://127.0.0.1:4321", "tcp4://127.0.0.1:4321", "tcp6://[::1]:4321"] {
            let uri = Url::parse(uri).unwrap();
            assert!(transport_for(&uri).is_ok(), "no transport for {uri}");
        }
    }

    #[test]
    fn unknown_scheme_is_an_error() {
        let uri = Url::parse("carrier-pigeon://coop").unwrap();
        assert!(matches!(
            transport_for(&uri),
            Err(HproseError::User(_))
        ));
    }

    #[test]
    fn extension_hook_registers_new_scheme() {
        register_transport("loop", Arc::new(|_| Ok(Box::new(Loopback))));
        let uri = Url::parse("loop://anywhere").unwrap();
        assert!(transport_for(&uri).is_ok());
    }
}
