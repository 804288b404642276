//! Virtual holder connection task
//!
//! Serves one open connection to a simulated device. The task reads request
//! lines from the stream and writes the device's replies back, until the
//! host closes the stream or the device is unplugged. Unplugging drops the
//! stream, which the host observes as a closed connection.

use std::io;

use dock_protocol::LineCodec;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::holder::HolderHandle;

/// Run the device side of one connection
pub async fn run_virtual_holder_task<S>(mut stream: S, holder: HolderHandle) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut plugged = holder.subscribe_plugged();
    let mut codec = LineCodec::new();
    let mut buf = [0u8; 256];

    loop {
        if !*plugged.borrow_and_update() {
            debug!("Virtual holder unplugged, dropping connection");
            break;
        }

        tokio::select! {
            // Unplugging wins over pending input
            biased;

            changed = plugged.changed() => {
                if changed.is_err() {
                    break;
                }
            }

            result = stream.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        debug!("Virtual holder connection closed by host");
                        break;
                    }
                    Ok(n) => {
                        codec.push_bytes(&buf[..n]);
                        while let Some(line) = codec.next_line() {
                            trace!("Virtual holder received {:?}", line);
                            if let Some(reply) = holder.respond(&line) {
                                stream.write_all(&reply).await?;
                                stream.flush().await?;
                            }
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::holder::{Personality, VirtualHolder};

    #[tokio::test]
    async fn test_task_answers_handshake_and_status() {
        let (mut host, device) = tokio::io::duplex(256);
        let holder = HolderHandle::new(VirtualHolder::new(Personality::Holder));
        holder.set_docked(true);

        let task = tokio::spawn(run_virtual_holder_task(device, holder.clone()));

        host.write_all(b"Are you a headphone holder?\nDocked?\n")
            .await
            .unwrap();

        let expected = b"Yes I am!\r\nYes!\r\n";
        let mut received = Vec::new();
        let mut buf = [0u8; 64];
        while received.len() < expected.len() {
            let n = host.read(&mut buf).await.unwrap();
            assert!(n > 0);
            received.extend_from_slice(&buf[..n]);
        }
        assert_eq!(received, expected);

        drop(host);
        task.await.unwrap().unwrap();
        assert_eq!(holder.handshakes(), 1);
        assert_eq!(holder.status_queries(), 1);
    }

    #[tokio::test]
    async fn test_unplug_drops_connection() {
        let (mut host, device) = tokio::io::duplex(256);
        let holder = HolderHandle::new(VirtualHolder::new(Personality::Holder));

        let task = tokio::spawn(run_virtual_holder_task(device, holder.clone()));
        holder.unplug();

        tokio::time::timeout(Duration::from_millis(100), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(host.read(&mut buf).await.unwrap(), 0);
    }
}
