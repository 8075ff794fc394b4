use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ctrl+C flag shared by the signal handler and whoever polls it.
///
/// Once installed, SIGINT no longer ends kwfix. The interpreter child is in
/// the same process group and still receives the signal itself.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route Ctrl+C to a new flag. Only one handler may be installed per
    /// process.
    pub fn install() -> Result<Self> {
        let interrupt = Self::new();
        let handler = interrupt.clone();
        ctrlc::set_handler(move || handler.raise()).context("Failed to install Ctrl+C handler")?;
        tracing::debug!("ctrl+c handler installed");
        Ok(interrupt)
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Whether an interrupt arrived since the last call; clears the flag.
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears_flag() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.take());

        interrupt.clone().raise();
        assert!(interrupt.take());
        assert!(!interrupt.take());
    }
}
