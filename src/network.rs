use std::io::{self, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::thread;

use log::{error, info, warn};
use net2::TcpBuilder;

use crate::error::{Result, TransferError};
use crate::recv::handle_connection;

const LISTEN_BACKLOG: i32 = 128;

fn builder_for(addr: &SocketAddr) -> io::Result<TcpBuilder> {
    if addr.is_ipv4() {
        TcpBuilder::new_v4()
    } else {
        TcpBuilder::new_v6()
    }
}

/// Opens a stream to `addrstr`, trying every address it resolves to.
pub fn connect(addrstr: &str) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrstr.to_socket_addrs()? {
        match builder_for(&addr).and_then(|b| b.connect(addr)) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(ErrorKind::InvalidInput, "address resolved to nothing")
    }))
}

pub fn listen(addrstr: &str) -> Result<TcpListener> {
    let wrap = |source| TransferError::Connection {
        context: "listen on",
        addr: addrstr.to_string(),
        source,
    };
    let addr = addrstr
        .to_socket_addrs()
        .map_err(wrap)?
        .next()
        .ok_or_else(|| wrap(io::Error::new(ErrorKind::InvalidInput, "address resolved to nothing")))?;
    let builder = builder_for(&addr).map_err(wrap)?;
    builder.reuse_address(true).map_err(wrap)?;
    builder.bind(addr).map_err(wrap)?;
    builder.listen(LISTEN_BACKLOG).map_err(wrap)
}

// The listener itself is still usable after these.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted
    )
}

/// Accepts connections forever, one handler thread per connection.
///
/// Only returns when `accept` fails in a way the listener cannot recover from.
pub fn serve(listener: TcpListener, dest_dir: &Path) -> Result<()> {
    loop {
        let (conn, peer) = match listener.accept() {
            Ok(c) => c,
            Err(e) if is_transient(&e) => {
                warn!("accept connection: {}", e);
                continue;
            }
            Err(source) => {
                let addr = listener
                    .local_addr()
                    .map(|a| a.to_string())
                    .unwrap_or_default();
                return Err(TransferError::Connection {
                    context: "accept connection on",
                    addr,
                    source,
                });
            }
        };

        info!("incoming connection from {}", peer);
        let dir = dest_dir.to_path_buf();
        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || match handle_connection(conn, &dir) {
                Ok(received) if !received.is_complete() => warn!(
                    "{}: connection closed after {} of {} bytes of {:?}",
                    peer, received.written, received.declared, received.file_name
                ),
                Ok(received) => info!(
                    "{}: stored {} ({} bytes)",
                    peer,
                    received.path.display(),
                    received.written
                ),
                Err(e) => error!("handle conn from {}: {}", peer, e),
            });
        if let Err(e) = spawned {
            error!("spawn handler for {}: {}", peer, e);
        }
    }
}
