//! Hprose client — invokes remote methods over a framed transport.

pub mod tcp;
pub mod transport;

pub use transport::{register_transport, Transport, TransportFactory};

use bytes::BufMut;
use tokio::sync::oneshot;
use url::Url;

use crate::codec::{tag, Writer};
use crate::error::HproseError;
use crate::message::request::encode_call;
use crate::message::response::{decode_function_list, decode_reply};
use crate::message::{Reply, ResultMode};
use crate::types::Value;

/// Per-invocation overrides of the client defaults. `None` fields fall back
/// to the client-level settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvokeOptions {
    pub byref: Option<bool>,
    pub simple: Option<bool>,
    pub result_mode: ResultMode,
}

/// An Hprose RPC client. The URI scheme selects the transport (`tcp`,
/// `tcp4`, `tcp6` built in; others via [`register_transport`]).
pub struct Client {
    uri: Url,
    transport: Box<dyn Transport>,
    /// Default by-ref setting for invocations.
    pub byref: bool,
    /// Default simple-mode setting for invocations.
    pub simple: bool,
}

impl Client {
    pub fn new(uri: &str) -> Result<Self, HproseError> {
        let uri = parse_uri(uri)?;
        let transport = transport::transport_for(&uri)?;
        Ok(Self {
            uri,
            transport,
            byref: false,
            simple: false,
        })
    }

    pub fn uri(&self) -> &str {
        self.uri.as_str()
    }

    /// Repoints the client, rebuilding the transport if the scheme changed.
    pub fn set_uri(&mut self, uri: &str) -> Result<(), HproseError> {
        let uri = parse_uri(uri)?;
        if uri.scheme() != self.uri.scheme() {
            self.transport = transport::transport_for(&uri)?;
        }
        self.uri = uri;
        Ok(())
    }

    /// Invokes a remote method and decodes the response per the requested
    /// result mode. An `E` frame surfaces as [`HproseError::User`].
    pub async fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
        options: InvokeOptions,
    ) -> Result<Reply, HproseError> {
        let byref = options.byref.unwrap_or(self.byref);
        let simple = options.simple.unwrap_or(self.simple);

        let mut w = if simple {
            Writer::new_simple()
        } else {
            Writer::new()
        };
        encode_call(&mut w, name, &args, byref);
        w.buf_mut().put_u8(tag::END);

        let response = self.transport.exchange(&self.uri, w.bytes()).await?;
        decode_reply(&response, options.result_mode)
    }

    /// Queries the service's published method names with a bare-`z` frame.
    pub async fn function_list(&self) -> Result<Vec<String>, HproseError> {
        let response = self.transport.exchange(&self.uri, &[tag::END]).await?;
        decode_function_list(&response)
    }
}

/// Invokes without blocking the caller: the round-trip runs on a spawned
/// task and the reply arrives on a one-shot channel. There is no
/// cancellation; drop the receiver to discard the result.
pub fn invoke_detached(
    client: std::sync::Arc<Client>,
    name: String,
    args: Vec<Value>,
    options: InvokeOptions,
) -> oneshot::Receiver<Result<Reply, HproseError>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let reply = client.invoke(&name, args, options).await;
        let _ = tx.send(reply);
    });
    rx
}

fn parse_uri(uri: &str) -> Result<Url, HproseError> {
    Url::parse(uri).map_err(|e| HproseError::User(format!("the uri can't be parsed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Arity, MethodOptions, Server, Service};
    use std::net::SocketAddr;
    use std::sync::Arc;

    async fn spawn_test_server() -> SocketAddr {
        let mut service = Service::new();
        service.add_function("hello", Arity::Fixed(1), MethodOptions::default(), |args| {
            let name = args[0].to_string_value()?;
            Ok(vec![Value::from(format!("Hello {name}!"))])
        });
        service.add_function("swap", Arity::Fixed(2), MethodOptions::default(), |args| {
            Ok(vec![args[1].clone(), args[0].clone()])
        });
        service.add_function("sum", Arity::Variadic(0), MethodOptions::default(), |args| {
            let mut total = 0;
            for a in args.iter() {
                total += a.to_i64()?;
            }
            if args.len() < 2 {
                return Err(HproseError::User(
                    "Requires at least two parameters".to_string(),
                ));
            }
            Ok(vec![Value::Int(total)])
        });
        service.add_function(
            "swapkv",
            Arity::Fixed(1),
            MethodOptions::default(),
            |args| {
                let Value::Map(pairs) = &args[0] else {
                    return Err(HproseError::User("map expected".to_string()));
                };
                let swapped: Vec<_> = pairs
                    .read()
                    .unwrap()
                    .iter()
                    .map(|(k, v)| (v.clone(), k.clone()))
                    .collect();
                args[0] = Value::map(swapped);
                Ok(vec![Value::Null])
            },
        );
        service.add_function("crash", Arity::Fixed(0), MethodOptions::default(), |_| {
            panic!("I'm crazy")
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(Server::new(service).serve_on(listener));
        addr
    }

    fn client_for(addr: SocketAddr) -> Client {
        Client::new(&format!("tcp://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn invoke_round_trip() {
        let addr = spawn_test_server().await;
        let client = client_for(addr);
        let reply = client
            .invoke("hello", vec![Value::from("World")], InvokeOptions::default())
            .await
            .unwrap();
        assert_eq!(reply.result, Value::from("Hello World!"));
    }

    #[tokio::test]
    async fn multi_results_arrive_as_list() {
        let addr = spawn_test_server().await;
        let client = client_for(addr);
        let reply = client
            .invoke(
                "swap",
                vec![Value::Int(1), Value::Int(2)],
                InvokeOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(
            reply.result,
            Value::list(vec![Value::Int(2), Value::Int(1)])
        );
    }

    #[tokio::test]
    async fn service_error_surfaces_as_user_error() {
        let addr = spawn_test_server().await;
        let client = client_for(addr);
        let err = client
            .invoke("sum", vec![Value::Int(1)], InvokeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HproseError::User(m) if m == "Requires at least two parameters"));
    }

    #[tokio::test]
    async fn panic_text_crosses_the_wire() {
        let addr = spawn_test_server().await;
        let client = client_for(addr);
        let err = client
            .invoke("crash", vec![], InvokeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HproseError::User(m) if m == "I'm crazy"));
    }

    #[tokio::test]
    async fn byref_returns_mutated_args() {
        let addr = spawn_test_server().await;
        let client = client_for(addr);
        let map = Value::map(vec![(Value::from("Jan"), Value::from("January"))]);
        let options = InvokeOptions {
            byref: Some(true),
            ..Default::default()
        };
        let reply = client.invoke("swapkv", vec![map], options).await.unwrap();
        let echoed = reply.args.unwrap();
        assert_eq!(
            echoed[0],
            Value::map(vec![(Value::from("January"), Value::from("Jan"))])
        );
    }

    #[tokio::test]
    async fn raw_mode_returns_bytes() {
        let addr = spawn_test_server().await;
        let client = client_for(addr);
        let options = InvokeOptions {
            result_mode: ResultMode::RawWithEndTag,
            ..Default::default()
        };
        let reply = client
            .invoke("hello", vec![Value::from("World")], options)
            .await
            .unwrap();
        assert_eq!(&reply.raw.unwrap()[..], b"Rs12\"Hello World!\"z");
    }

    #[tokio::test]
    async fn simple_mode_requests_skip_the_reference_table() {
        let addr = spawn_test_server().await;
        let client = client_for(addr);
        let options = InvokeOptions {
            simple: Some(true),
            ..Default::default()
        };
        let arg = Value::from("World");
        let reply = client
            .invoke("hello", vec![arg], options)
            .await
            .unwrap();
        assert_eq!(reply.result, Value::from("Hello World!"));
    }

    #[tokio::test]
    async fn function_list_discovery() {
        let addr = spawn_test_server().await;
        let client = client_for(addr);
        let names = client.function_list().await.unwrap();
        assert_eq!(names, vec!["hello", "swap", "sum", "swapkv", "crash"]);
    }

    #[tokio::test]
    async fn detached_invoke_delivers_on_channel() {
        let addr = spawn_test_server().await;
        let client = Arc::new(client_for(addr));
        let rx = invoke_detached(
            client,
            "hello".to_string(),
            vec![Value::from("World")],
            InvokeOptions::default(),
        );
        let reply = rx.await.unwrap().unwrap();
        assert_eq!(reply.result, Value::from("Hello World!"));
    }

    #[tokio::test]
    async fn set_uri_repoints_the_client() {
        let addr_a = spawn_test_server().await;
        let addr_b = spawn_test_server().await;
        let mut client = client_for(addr_a);
        client.set_uri(&format!("tcp://{addr_b}")).unwrap();
        assert_eq!(client.uri(), format!("tcp://{addr_b}"));
        let reply = client
            .invoke("hello", vec![Value::from("B")], InvokeOptions::default())
            .await
            .unwrap();
        assert_eq!(reply.result, Value::from("Hello B!"));
    }
}
