//! One status poll on a bound link

use dock_detect::{DockLink, LinkError};
use dock_protocol::{DockRequest, PollResponse};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Ask the holder for its docked state once
///
/// Timeouts come back as [`PollResponse::Timeout`]. An error means the link
/// is gone and must be dropped.
pub async fn poll_once<S>(link: &mut DockLink<S>) -> Result<PollResponse, LinkError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match link.exchange(DockRequest::Status).await {
        Ok(line) => {
            let response = PollResponse::classify(&line);
            if response == PollResponse::Unrecognized {
                debug!("Ignoring unrecognized reply on {}: {:?}", link.port(), line);
            }
            Ok(response)
        }
        Err(e) if e.is_timeout() => {
            debug!("Status poll on {} {}", link.port(), e);
            Ok(PollResponse::Timeout)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dock_detect::LinkConfig;
    use dock_sim::{run_virtual_holder_task, HolderHandle, Personality, VirtualHolder};
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    fn link_to(holder: &HolderHandle) -> DockLink<DuplexStream> {
        let (host, device) = tokio::io::duplex(256);
        tokio::spawn(run_virtual_holder_task(device, holder.clone()));
        DockLink::new("sim0", host, LinkConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_reports_state() {
        let holder = HolderHandle::new(VirtualHolder::new(Personality::Holder));
        let mut link = link_to(&holder);

        assert_eq!(poll_once(&mut link).await.unwrap(), PollResponse::Undocked);
        holder.set_docked(true);
        assert_eq!(poll_once(&mut link).await.unwrap(), PollResponse::Docked);
        assert_eq!(holder.status_queries(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_benign() {
        let holder = HolderHandle::new(VirtualHolder::new(Personality::Holder));
        holder.set_muted(true);
        let mut link = link_to(&holder);

        assert_eq!(poll_once(&mut link).await.unwrap(), PollResponse::Timeout);

        // The link still works once the holder answers again
        holder.set_muted(false);
        assert_eq!(poll_once(&mut link).await.unwrap(), PollResponse::Undocked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecognized_reply() {
        let holder = HolderHandle::new(VirtualHolder::new(Personality::Impostor(
            "Maybe?".to_string(),
        )));
        let mut link = link_to(&holder);

        assert_eq!(
            poll_once(&mut link).await.unwrap(),
            PollResponse::Unrecognized
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_is_error() {
        let holder = HolderHandle::new(VirtualHolder::new(Personality::Holder));
        let mut link = link_to(&holder);
        assert!(poll_once(&mut link).await.is_ok());

        holder.unplug();
        let err = poll_once(&mut link).await.unwrap_err();
        assert!(!err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exact_reply_required() {
        let (host, mut device) = tokio::io::duplex(256);
        let mut link = DockLink::new("sim0", host, LinkConfig::default());

        let device_task = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            for reply in [&b"Yes! \r\n"[..], &b"yes!\r\n"[..], &b"No!\r\n"[..]] {
                let _ = device.read(&mut buf).await.unwrap();
                device.write_all(reply).await.unwrap();
            }
            device
        });

        assert_eq!(
            poll_once(&mut link).await.unwrap(),
            PollResponse::Unrecognized
        );
        assert_eq!(
            poll_once(&mut link).await.unwrap(),
            PollResponse::Unrecognized
        );
        assert_eq!(poll_once(&mut link).await.unwrap(), PollResponse::Undocked);
        let _device = device_task.await.unwrap();
    }
}
