use crate::events::{Emitter, EventName, EventSource, Payload, Socket, SocketEmitter};
use crate::http::body::TrackedBody;
use crate::http::origin::Origin;
use crate::tls::build_client_config;
use anyhow::Context;
use bytes::{Bytes, BytesMut};
use http::header::{CONNECTION, HOST};
use http::HeaderValue;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::client::conn::http1::{self, SendRequest};
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use pki_types::ServerName;
use rustls::ClientConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::{timeout_at, Instant};
use tokio_rustls::TlsConnector;
use tracing::{Instrument, Span};

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Deadline for one whole exchange, connect through last body byte.
    pub timeout: Duration,
    pub skip_certificate_validate: bool,
    /// PEM bundle replacing the webpki roots.
    pub certificate_path: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            skip_certificate_validate: false,
            certificate_path: None,
        }
    }
}

struct Connection {
    origin: Origin,
    sender: SendRequest<TrackedBody>,
    socket: Arc<SocketEmitter>,
}

/// HTTP/1.1 client that reports every request's lifecycle on an [`Emitter`].
///
/// Events emitted on the request emitter passed to [`Agent::send`]:
/// `socket`, `finish`, `response` and `error` (before headers arrive). The
/// socket gets `lookup`, `connect` and `secureConnect`; the response gets
/// `end`, or `error` if the body fails. One idle connection is kept and
/// reused for the next request to the same origin.
pub struct Agent {
    tls_config: Arc<ClientConfig>,
    timeout: Duration,
    idle: Option<Connection>,
}

impl Agent {
    pub fn new(config: &AgentConfig) -> Result<Self, anyhow::Error> {
        let tls_config = build_client_config(
            config.skip_certificate_validate,
            config.certificate_path.as_deref(),
        )?;
        Ok(Self {
            tls_config,
            timeout: config.timeout,
            idle: None,
        })
    }

    /// Sends `request` and reads the whole response body.
    ///
    /// Failures are emitted as `error` on the request or response emitter
    /// and then returned.
    pub async fn send(
        &mut self,
        request: Request<Bytes>,
        events: Arc<Emitter>,
    ) -> Result<Response<Bytes>, anyhow::Error> {
        let deadline = Instant::now() + self.timeout;
        let limit = self.timeout;

        let (response, connection) = match timeout_at(deadline, self.round_trip(request, &events)).await {
            Ok(Ok(exchanged)) => exchanged,
            Ok(Err(e)) => return Err(emit_error(&events, e)),
            Err(_) => return Err(emit_error(&events, timed_out(limit))),
        };

        let (parts, mut incoming) = response.into_parts();
        debug!("< {:?} {}", parts.version, parts.status);
        for (key, value) in parts.headers.iter() {
            trace!("< {}: {:?}", key, value);
        }

        let response_events = Arc::new(Emitter::new());
        let response_source: Arc<dyn EventSource> = response_events.clone();
        events.emit(EventName::Response, &Payload::Response(&response_source));

        let body = match timeout_at(deadline, read_body(&mut incoming)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return Err(emit_error(&response_events, e)),
            Err(_) => return Err(emit_error(&response_events, timed_out(limit))),
        };
        response_events.emit(EventName::End, &Payload::None);

        let keep_alive = !parts
            .headers
            .get(CONNECTION)
            .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"close"));
        if keep_alive && !connection.sender.is_closed() {
            self.idle = Some(connection);
        }

        Ok(Response::from_parts(parts, body))
    }

    async fn round_trip(
        &mut self,
        request: Request<Bytes>,
        events: &Arc<Emitter>,
    ) -> Result<(Response<Incoming>, Connection), anyhow::Error> {
        let origin = Origin::from_uri(request.uri())?;
        let request = into_origin_form(request)?;

        let mut connection = match self.checkout(&origin).await {
            Some(connection) => {
                debug!("Reusing connection to {}", origin);
                let socket: Arc<dyn Socket> = connection.socket.clone();
                events.emit(EventName::Socket, &Payload::Socket(&socket));
                connection
            }
            None => {
                let socket = Arc::new(SocketEmitter::new());
                let handle: Arc<dyn Socket> = socket.clone();
                events.emit(EventName::Socket, &Payload::Socket(&handle));
                let sender = self.connect(&origin, &socket).await?;
                Connection {
                    origin,
                    sender,
                    socket,
                }
            }
        };

        debug!(
            "> {} {} {:?}",
            request.method(),
            request.uri(),
            request.version()
        );
        let finished = events.clone();
        let request = request.map(|bytes| {
            TrackedBody::new(bytes, move || {
                finished.emit(EventName::Finish, &Payload::None);
            })
        });
        let response = connection
            .sender
            .send_request(request)
            .await
            .context("Failed to execute request")?;
        Ok((response, connection))
    }

    /// Takes the idle connection if it serves `origin` and is still usable.
    async fn checkout(&mut self, origin: &Origin) -> Option<Connection> {
        let mut connection = self.idle.take()?;
        if connection.origin != *origin {
            debug!("Dropping idle connection to {}", connection.origin);
            return None;
        }
        match connection.sender.ready().await {
            Ok(()) => Some(connection),
            Err(e) => {
                debug!("Idle connection to {} is gone: {}", origin, e);
                None
            }
        }
    }

    async fn connect(
        &self,
        origin: &Origin,
        socket: &SocketEmitter,
    ) -> Result<SendRequest<TrackedBody>, anyhow::Error> {
        let addrs: Vec<SocketAddr> = match origin.ip() {
            Some(ip) => vec![SocketAddr::new(ip, origin.port)],
            None => {
                debug!("Resolving DNS for: {}", origin.host);
                let addrs: Vec<SocketAddr> = lookup_host((origin.host.as_str(), origin.port))
                    .await
                    .with_context(|| format!("Failed to resolve host {}", origin.host))?
                    .collect();
                info!("Resolved DNS for {}: {:?}", origin.host, addrs);
                ensure!(
                    !addrs.is_empty(),
                    "No IP addresses found for host {}",
                    origin.host
                );
                socket.emit(EventName::Lookup, &Payload::None);
                addrs
            }
        };

        let stream = connect_any(&addrs).await?;
        socket.set_connected();

        let local_addr = stream.local_addr()?.to_string();
        let remote_addr = stream.peer_addr()?.to_string();
        let span = info_span!("rtimer", localAddr = %local_addr, remoteAddr = %remote_addr);

        if origin.secure {
            let connector = TlsConnector::from(self.tls_config.clone());
            let domain = ServerName::try_from(origin.host.clone())
                .map_err(|e| anyhow!("Invalid server name {}: {}", origin.host, e))?;
            let tls_stream = connector
                .connect(domain, stream)
                .instrument(info_span!("Tls Handshake"))
                .await
                .with_context(|| format!("TLS handshake with {} failed", origin))?;
            socket.emit(EventName::SecureConnect, &Payload::None);
            handshake(tls_stream, span).await
        } else {
            handshake(stream, span).await
        }
    }
}

async fn connect_any(addrs: &[SocketAddr]) -> Result<TcpStream, anyhow::Error> {
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(anyhow::Error::new(e).context(format!("Failed to connect to {}", addr)));
            }
        }
    }
    Err(last_error.unwrap_or_else(|| anyhow!("No address to connect to")))
}

async fn handshake<T>(io: T, span: Span) -> Result<SendRequest<TrackedBody>, anyhow::Error>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (sender, conn) = http1::handshake(TokioIo::new(io))
        .instrument(info_span!("Http Handshake"))
        .await?;
    tokio::task::spawn(
        async move {
            if let Err(err) = conn.await {
                debug!("Connection failed: {:?}", err);
            }
        }
        .instrument(span),
    );
    Ok(sender)
}

/// Rewrites an absolute-form request to origin-form with a `Host` header,
/// which is what an HTTP/1.1 connection expects.
fn into_origin_form(mut request: Request<Bytes>) -> Result<Request<Bytes>, anyhow::Error> {
    let uri = request.uri().clone();
    if !request.headers().contains_key(HOST) {
        let authority = uri
            .authority()
            .ok_or_else(|| anyhow!("Can not find host in the uri:{}.", uri))?;
        request
            .headers_mut()
            .insert(HOST, HeaderValue::from_str(authority.as_str())?);
    }
    let path = uri.path_and_query().map_or("/", |p| p.as_str());
    *request.uri_mut() = path.parse()?;
    Ok(request)
}

async fn read_body(incoming: &mut Incoming) -> Result<Bytes, anyhow::Error> {
    let mut body = BytesMut::new();
    while let Some(frame) = incoming.frame().await {
        let frame = frame.context("Error while reading response body")?;
        if let Ok(data) = frame.into_data() {
            body.extend_from_slice(&data);
        }
    }
    Ok(body.freeze())
}

fn emit_error(origin: &Emitter, err: anyhow::Error) -> anyhow::Error {
    origin.emit(EventName::Error, &Payload::Error(&err));
    err
}

fn timed_out(limit: Duration) -> anyhow::Error {
    anyhow!("Request timed out after {} ms", limit.as_millis())
}
