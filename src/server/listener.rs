use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http::connection::{Connection, Handler};

/// Handle to a running server. Dropping it stops accepting new connections;
/// connections already accepted run to completion.
pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    accept_task: Option<JoinHandle<()>>,
}

/// Binds `cfg.listen_addr` and starts accepting in a background task.
///
/// Every connection gets its own task which parses one request, runs
/// `handler` and closes the socket.
pub async fn serve<H: Handler>(cfg: &Config, handler: H) -> anyhow::Result<Server> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.listen_addr))?;
    let local_addr = listener.local_addr()?;
    info!("Listening on {}", local_addr);

    let closed = Arc::new(AtomicBool::new(false));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let accept_task = tokio::spawn(accept_loop(
        listener,
        Arc::new(handler),
        cfg.read_timeout(),
        shutdown_rx,
    ));

    Ok(Server {
        local_addr,
        closed,
        shutdown_tx,
        accept_task: Some(accept_task),
    })
}

impl Server {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting connections. Calling it again is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.shutdown_tx.send(true);
        info!("Server on {} closed", self.local_addr);
    }

    /// Closes the server and waits until the listener has been released.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        self.close();
        if let Some(task) = self.accept_task.take() {
            task.await?;
        }
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.close();
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    read_timeout: Option<Duration>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        // Shutdown is polled first, so nothing is accepted once close ran.
        let accepted = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            res = listener.accept() => res,
        };

        match accepted {
            Ok((socket, peer)) => {
                debug!("Accepted connection from {}", peer);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    let conn = Connection::new(socket, peer, read_timeout);
                    if let Err(e) = conn.run(handler.as_ref()).await {
                        error!("Connection error from {}: {}", peer, e);
                    }
                });
            }
            Err(e) => warn!(error = %e, "failed to accept connection"),
        }
    }
    debug!("Accept loop stopped");
}
