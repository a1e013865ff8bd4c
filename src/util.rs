/// Format a count of seconds as elapsed-time text: `MM:SS`, or `H:MM:SS` from one hour up
pub fn format_elapsed(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    match hours {
        0 => format!("{:02}:{:02}", minutes, seconds),
        _ => format!("{}:{:02}:{:02}", hours, minutes, seconds),
    }
}
