use std::io::{ErrorKind, Read, Write};

use log::debug;

use crate::error::{Result, TransferError};
use crate::network::connect;
use crate::protocol::{TransferHeader, CHUNK_SIZE};

/// Streams `source` to the receiver at `server_address`.
///
/// `file_size` goes into the header as-is; it is up to the caller that it
/// matches what `source` yields. Returns the number of payload bytes sent.
pub fn send_file<R: Read>(
    file_name: &str,
    file_size: u64,
    mut source: R,
    server_address: &str,
) -> Result<u64> {
    let mut conn = connect(server_address).map_err(|source| TransferError::Connection {
        context: "connect to",
        addr: server_address.to_string(),
        source,
    })?;

    let header = TransferHeader::new(file_name, file_size);
    conn.write_all(&header.size_field())
        .map_err(|source| TransferError::Write {
            to: "file size",
            source,
        })?;
    conn.write_all(&header.name_field())
        .map_err(|source| TransferError::Write {
            to: "file name",
            source,
        })?;

    let mut buff = [0u8; CHUNK_SIZE];
    let mut sent: u64 = 0;
    loop {
        let n = match source.read(&mut buff) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(TransferError::Read { from: "file", source }),
        };
        conn.write_all(&buff[..n])
            .map_err(|source| TransferError::Write {
                to: "buffer to connection",
                source,
            })?;
        sent += n as u64;
    }
    debug!("sent {} payload bytes to {}", sent, server_address);
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::net::TcpListener;
    use std::thread;

    fn capture() -> (String, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            conn.read_to_end(&mut buf).unwrap();
            buf
        });
        (addr, handle)
    }

    #[test]
    fn writes_frame() {
        let (addr, handle) = capture();
        let sent = send_file("hi.txt", 3, &b"abc"[..], &addr).unwrap();
        assert_eq!(sent, 3);

        let mut expected = vec![0, 0, 0, 0, 0, 0, 0, 3, b'\n'];
        expected.extend_from_slice(b"hi.txt\nabc");
        assert_eq!(handle.join().unwrap(), expected);
    }

    #[test]
    fn payload_spanning_many_chunks() {
        let (addr, handle) = capture();
        let payload = vec![0x5a; CHUNK_SIZE * 3 + 17];
        send_file("p", payload.len() as u64, &payload[..], &addr).unwrap();

        let wire = handle.join().unwrap();
        assert_eq!(&wire[11..], &payload[..]);
    }

    #[test]
    fn size_is_not_checked_against_source() {
        let (addr, handle) = capture();
        let sent = send_file("liar", 100, &b"short"[..], &addr).unwrap();
        assert_eq!(sent, 5);
        assert_eq!(&handle.join().unwrap()[..8], &100u64.to_be_bytes());
    }

    #[test]
    fn refused_connection() {
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().to_string()
        };
        assert!(matches!(
            send_file("x", 0, &b""[..], &addr),
            Err(TransferError::Connection { .. })
        ));
    }

    #[test]
    fn receiver_hangs_up() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (conn, _) = listener.accept().unwrap();
            drop(conn);
        });

        // far more than the socket buffers hold, so a write has to hit the closed peer
        let payload = vec![0u8; 64 * 1024 * 1024];
        let result = send_file("big", payload.len() as u64, &payload[..], &addr);
        handle.join().unwrap();
        assert!(matches!(result, Err(TransferError::Write { .. })));
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn source_read_failure() {
        let (addr, handle) = capture();
        assert!(matches!(
            send_file("x", 10, Broken, &addr),
            Err(TransferError::Read { from: "file", .. })
        ));
        // the header still went out before the failure
        assert_eq!(handle.join().unwrap().len(), 11);
    }
}
