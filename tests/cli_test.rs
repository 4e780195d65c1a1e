use std::process::Command;

fn fleet_sim() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fleet_sim"));
    cmd.env("RUST_LOG", "warn,fleet_sim=info");
    cmd
}

/// Test that the headless run completes and logs its statistics
#[test]
fn test_headless_run_completes() {
    let output = fleet_sim()
        .args(["--ticks", "50", "--summary-every", "0"])
        .output()
        .expect("Failed to execute simulation");

    assert!(
        output.status.success(),
        "Simulation failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
    for stat in ["Ticks run: 50", "Alerts raised:", "Reroutes accepted:", "Arrivals:"] {
        assert!(stderr.contains(stat), "Missing '{}' statistic", stat);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Fleet Simulation Summary ==="));
    assert!(stdout.contains("=== Fleet Map"));
}

/// Test that a scheduled reroute brings T-04 to the haven
#[test]
fn test_scheduled_reroute_arrives() {
    let output = fleet_sim()
        .args([
            "--ticks",
            "200",
            "--summary-every",
            "0",
            "--reroute",
            "T-04@10",
            "--mute",
            "--json",
        ])
        .output()
        .expect("Failed to execute simulation");

    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Reroutes accepted: 1"), "stderr: {}", stderr);
    assert!(stderr.contains("Arrivals: 1"), "stderr: {}", stderr);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"SAFE_ARRIVAL\""));
}

/// Test that a malformed reroute flag is rejected
#[test]
fn test_bad_reroute_flag_fails() {
    let output = fleet_sim()
        .args(["--reroute", "T-04"])
        .output()
        .expect("Failed to execute simulation");

    assert!(!output.status.success());
}

/// Test that a missing scenario file is reported
#[test]
fn test_missing_scenario_fails() {
    let output = fleet_sim()
        .args(["--scenario", "/nonexistent/scenario.json", "--ticks", "1"])
        .output()
        .expect("Failed to execute simulation");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("loading scenario"), "stderr: {}", stderr);
}
