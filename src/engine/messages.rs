//! Spoken and displayed phrases

pub const WELCOME: &str =
    "Welcome to VoiceCare. Add your medicines and choose a time, then press 'Start Medication Reminder'.";

pub const IDLE_STATUS: &str = "Idle (Tap mic to speak)";

pub const SETUP_PROMPT: &str = "Setup Mode activated. Please say the name of the medicine you want to add, for example, say 'Tylenol', or say 'cancel' to exit setup mode.";
pub const SETUP_RETRY: &str =
    "Please say the name of the medicine you want to add, or say 'cancel'.";
pub const SETUP_CANCELLED: &str = "Setup mode cancelled.";
pub const SETUP_CANCELLED_LOG: &str = "Setup mode cancelled by voice.";

pub const NO_SPEECH_LOG: &str = "No speech detected. Asking user to repeat if in setup mode.";
pub const NO_SPEECH_SETUP_RETRY: &str =
    "I didn't hear you. Please say the name of the medicine, or say 'cancel'.";

pub const PERMISSION_STATUS: &str =
    "🚫 Permission Denied! Allow microphone in browser settings.";
pub const PERMISSION_LOG: &str = "Microphone access is denied. Open the site or system settings for this speech client, allow the microphone, then restart listening.";
pub const PERMISSION_SPEECH: &str = "Microphone access is blocked. Please allow microphone for this website in the browser address bar and reload the page.";

pub const LISTEN_UNAVAILABLE_LOG: &str = "Speech recognition is not available: no speech client is attached.";
pub const LISTEN_UNAVAILABLE_SPEECH: &str =
    "I cannot listen because no speech recognition is available.";

pub const UNRECOGNIZED: &str =
    "I did not understand. In Reminder Mode, please say 'done' or 'repeat'.";
pub const UNRECOGNIZED_LOG: &str = "Unrecognized command from patient in Reminder Mode.";

pub const REPEATING: &str = "Repeating the reminder.";

pub const NOTHING_SCHEDULED: &str =
    "Reminder check completed. No medications are currently scheduled.";
pub const NOTHING_SCHEDULED_LOG: &str = "No medications scheduled.";

pub const SECOND_REMINDER: &str =
    "Second reminder: You still have not confirmed taking your medicine. Please confirm now.";
pub const SECOND_REMINDER_LOG: &str = "⚠ Second reminder issued. Awaiting confirmation.";
pub const SECOND_REMINDER_STATUS: &str = "⚠ Awaiting confirmation from patient.";

pub const CRITICAL: &str =
    "Alert: Too many missed confirmations. Please contact your doctor or caregiver immediately.";
pub const CRITICAL_LOG: &str = "🚨 Escalation triggered: too many missed doses.";
pub const CRITICAL_STATUS: &str = "🚨 CRITICAL ALERT: Multiple missed doses.";

pub const CONFIRMED: &str = "Great job. I have recorded your confirmation. Stay healthy!";
pub const CONFIRMED_LOG: &str = "Medications confirmed by patient.";
pub const CONFIRMED_STATUS: &str = "✔ Medications confirmed. Waiting for the next reminder.";

pub const INVALID_TIME_LOG: &str =
    "Invalid time format. Please pick a valid time from the time picker.";
pub const INVALID_TIME: &str =
    "The reminder time format is invalid. Please choose a time from the time picker.";

pub const DAILY_STARTED_LOG: &str = "Daily reminder interval started (every 24 hours).";

pub fn reminder(time: &str, list: &str) -> String {
    format!(
        "It is {time}. Please take your medications: {list}. Say 'Done' or 'Taken' when you are finished."
    )
}

pub fn activated(count: usize, time: &str) -> String {
    format!(
        "VoiceCare reminder system activated. I will remind you to take {count} medications at {time} every day."
    )
}

pub fn scheduled_status(time: &str, count: usize) -> String {
    format!("⏰ Reminder scheduled for {time} ({count} meds).")
}

pub fn first_fire_eta(minutes: u64) -> String {
    format!("First reminder will fire in about {minutes} minute(s).")
}

pub fn added_spoken(name: &str) -> String {
    format!("{name} has been added to your reminder list.")
}

pub fn duplicate_spoken(name: &str) -> String {
    format!("I'm sorry, {name} is already on your list.")
}

pub fn error_idle_status(class: &str) -> String {
    format!("Idle (Error: {class}. Tap mic to speak again)")
}
