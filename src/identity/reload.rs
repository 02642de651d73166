use tokio::sync::watch;

/// The hosting context's full-reload hook. Called as the last effect of a
/// group switch; whoever owns the session must discard it and build a fresh
/// one.
pub trait PageReloader: Send + Sync {
    fn reload(&self);
}

/// Reload requests delivered over a watch channel. The value is the number of
/// reloads requested so far, so a host loop can `changed().await` on it.
pub struct ReloadSignal {
    tx: watch::Sender<u64>,
}

impl ReloadSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    pub fn count(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for ReloadSignal {
    fn default() -> Self { Self::new() }
}

impl PageReloader for ReloadSignal {
    fn reload(&self) {
        self.tx.send_modify(|n| *n += 1);
        tracing::info!(target: "ssui::session", "full reload requested (count={})", self.count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_reloads() {
        let signal = ReloadSignal::new();
        let mut rx = signal.subscribe();
        assert_eq!(signal.count(), 0);
        signal.reload();
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow(), 1);
        assert_eq!(signal.count(), 1);
    }
}
