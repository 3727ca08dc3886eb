use std::process::Command;

#[test]
fn prints_the_requested_number_of_entries() {
    let output = Command::new(env!("CARGO_BIN_EXE_noise-maker"))
        .args(["--count", "40", "--rate", "0", "--day", "2019-05-14", "--seed", "9"])
        .output()
        .expect("Failed to run noise-maker");

    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "noise-maker wrote to stderr");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let entries: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("entry is not json"))
        .collect();
    assert_eq!(entries.len(), 40);
    assert!(
        entries
            .iter()
            .all(|e| e["time"].as_str().unwrap().starts_with("2019-05-14"))
    );
}
