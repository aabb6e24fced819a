use anyhow::Result;

use crate::alerts::DesktopNotifier;

pub fn handle_test_notification_command(json_output: bool) -> Result<()> {
    if !DesktopNotifier::is_available() {
        tracing::warn!("no desktop session detected, the notification may not be shown");
    }

    DesktopNotifier::new(true).send_test_notification()?;

    if json_output {
        println!(r#"{{"status": "success", "message": "Test notification sent"}}"#);
    } else {
        println!("Test notification sent.");
    }
    Ok(())
}
