use super::Snapshot;

const COLUMN_WIDTH: usize = 17;
const RULE: &str = "--------------------------------------";

/// Side-by-side count comparison of the previous and current shot snapshots.
pub fn snapshot_report(previous: &Snapshot, current: &Snapshot) -> String {
    let mut report = String::new();
    report.push_str(RULE);
    report.push('\n');
    report.push_str("PREVIOUS SNAPSHOT | CURRENT SNAPSHOT \n");
    report.push_str("------------------|-------------------\n");

    for colour in previous.colours() {
        let name = colour.name().to_lowercase();
        let prev = format!("{}s: {}", name, previous.count(colour));
        let cur = format!("{}s: {}", name, current.count(colour));
        report.push_str(&format!("{:<width$} | {}\n", prev, cur, width = COLUMN_WIDTH));
    }

    report.push_str(RULE);
    report.push('\n');
    report
}
