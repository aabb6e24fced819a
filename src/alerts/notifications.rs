use anyhow::{Context, Result};
use notify_rust::{Notification, Timeout};

/// Delivers a user-visible alert. Fire-and-forget from the caller's point of
/// view: an `Err` is logged by the caller and otherwise ignored.
pub trait NotificationDispatcher {
    fn dispatch(&self, title: &str, body: &str) -> Result<()>;
}

/// Desktop notifications through the platform notification daemon.
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn send_test_notification(&self) -> Result<()> {
        if !self.enabled {
            return Err(anyhow::anyhow!("Desktop notifications are disabled"));
        }

        Notification::new()
            .summary("binwatch notification test")
            .body("Desktop notifications are working. You'll be alerted when a bin is full or its gas level is dangerous.")
            .timeout(Timeout::Milliseconds(5000))
            .urgency(notify_rust::Urgency::Normal)
            .appname("binwatch")
            .icon("dialog-information")
            .show()
            .context("Failed to show test notification")?;

        Ok(())
    }

    pub fn is_available() -> bool {
        #[cfg(target_os = "linux")]
        {
            std::env::var("DISPLAY").is_ok() || std::env::var("WAYLAND_DISPLAY").is_ok()
        }

        #[cfg(any(target_os = "macos", target_os = "windows"))]
        {
            true
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            false
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl NotificationDispatcher for DesktopNotifier {
    fn dispatch(&self, title: &str, body: &str) -> Result<()> {
        if !self.enabled {
            tracing::debug!(title, "desktop notifications disabled, skipping");
            return Ok(());
        }

        Notification::new()
            .summary(title)
            .body(body)
            .timeout(Timeout::Milliseconds(10000))
            .urgency(notify_rust::Urgency::Critical)
            .appname("binwatch")
            .icon("dialog-warning")
            .show()
            .context("Failed to show desktop notification")?;

        Ok(())
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new(Self::is_available())
    }
}

/// Writes alerts to the log instead of the desktop. Used when notifications
/// are disabled in the config, or the machine has no notification daemon.
pub struct LogNotifier;

impl NotificationDispatcher for LogNotifier {
    fn dispatch(&self, title: &str, body: &str) -> Result<()> {
        tracing::warn!(title, body, "alert");
        Ok(())
    }
}
